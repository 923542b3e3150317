use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use tracing::info;

use flaskr_types::api::CredentialsForm;

use crate::app::{AppState, run_blocking};
use crate::context::{LOGIN_PATH, RequestContext};
use crate::credentials;
use crate::error::AppError;
use crate::pages;

const REGISTER_PAGE: &str = "auth/register.html";
const LOGIN_PAGE: &str = "auth/login.html";

pub async fn register_form(ctx: RequestContext) -> Result<Html<String>, AppError> {
    pages::page(REGISTER_PAGE, &ctx, context! {})
}

pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let result = run_blocking(move || {
        credentials::register(&state.db, &form.username, &form.password)
    })
    .await;

    match result {
        Ok(_) => Redirect::to(LOGIN_PATH).into_response(),
        Err(err) if err.is_form_error() => pages::form_error(REGISTER_PAGE, &ctx, err, context! {}),
        Err(err) => err.into_response(),
    }
}

pub async fn login_form(ctx: RequestContext) -> Result<Html<String>, AppError> {
    pages::page(LOGIN_PAGE, &ctx, context! {})
}

pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let db_state = state.clone();
    let result = run_blocking(move || {
        credentials::verify(&db_state.db, &form.username, &form.password)
    })
    .await;

    let user = match result {
        Ok(user) => user,
        Err(err) if err.is_form_error() => return pages::form_error(LOGIN_PAGE, &ctx, err, context! {}),
        Err(err) => return err.into_response(),
    };

    match state.session.login(jar, user.id) {
        Ok(jar) => {
            info!(user_id = user.id, username = %user.username, "user logged in");
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => AppError::Internal(e).into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, ctx: RequestContext, jar: CookieJar) -> Response {
    if let Some(user) = &ctx.user {
        info!(user_id = user.id, "user logged out");
    }
    (state.session.logout(jar), Redirect::to("/")).into_response()
}
