use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;

use flaskr_types::PostId;
use flaskr_types::api::PostForm;

use crate::app::{AppState, run_blocking};
use crate::context::{Identity, RequestContext};
use crate::error::AppError;
use crate::{pages, posts};

const INDEX_PAGE: &str = "blog/index.html";
const CREATE_PAGE: &str = "blog/create.html";
const UPDATE_PAGE: &str = "blog/update.html";

/// GET /: every post, newest first.
pub async fn index(State(state): State<AppState>, ctx: RequestContext) -> Result<Html<String>, AppError> {
    let posts = run_blocking(move || posts::list_posts(&state.db)).await?;
    pages::page(INDEX_PAGE, &ctx, context! { posts => posts })
}

pub async fn create_form(Identity(user): Identity) -> Result<Html<String>, AppError> {
    pages::page(CREATE_PAGE, &RequestContext::authenticated(user), context! {})
}

/// POST /create
pub async fn create(
    State(state): State<AppState>,
    Identity(user): Identity,
    Form(form): Form<PostForm>,
) -> Response {
    let author = user.clone();
    let (title, body) = (form.title.clone(), form.body.clone());
    let result = run_blocking(move || {
        posts::create_post(&state.db, &author, &form.title, &form.body)
    })
    .await;

    match result {
        Ok(_) => Redirect::to("/").into_response(),
        // Keep what was typed so the form can be corrected
        Err(err) if err.is_form_error() => pages::form_error(
            CREATE_PAGE,
            &RequestContext::authenticated(user),
            err,
            context! { title => title, body => body },
        ),
        Err(err) => err.into_response(),
    }
}

/// GET /{id}/update. Only the author may open the edit form.
pub async fn update_form(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<PostId>,
) -> Result<Html<String>, AppError> {
    let requester = user.clone();
    let post = run_blocking(move || posts::get_owned_post(&state.db, id, &requester)).await?;
    pages::page(UPDATE_PAGE, &RequestContext::authenticated(user), context! { post => post })
}

/// POST /{id}/update
pub async fn update(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<PostId>,
    Form(form): Form<PostForm>,
) -> Response {
    let db_state = state.clone();
    let requester = user.clone();
    let result = run_blocking(move || {
        posts::update_post(&db_state.db, id, &requester, &form.title, &form.body)
    })
    .await;

    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) if err.is_form_error() => {
            // Re-show the stored post with the error, as on first load
            let requester = user.clone();
            match run_blocking(move || posts::get_owned_post(&state.db, id, &requester)).await {
                Ok(post) => pages::form_error(
                    UPDATE_PAGE,
                    &RequestContext::authenticated(user),
                    err,
                    context! { post => post },
                ),
                Err(e) => e.into_response(),
            }
        }
        Err(err) => err.into_response(),
    }
}

/// POST /{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<PostId>,
) -> Result<Redirect, AppError> {
    run_blocking(move || posts::delete_post(&state.db, id, &user)).await?;
    Ok(Redirect::to("/"))
}
