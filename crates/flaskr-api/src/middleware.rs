use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use flaskr_types::models::User;

use crate::app::{AppState, AppStateInner, run_blocking};
use crate::context::RequestContext;
use crate::error::AppError;

/// The user behind the request's session cookie. Missing, tampered or expired
/// sessions and deleted users all resolve to `None`.
pub fn resolve_identity(state: &AppStateInner, jar: &CookieJar) -> Result<Option<User>, AppError> {
    let Some(user_id) = state.session.user_id(jar) else {
        return Ok(None);
    };

    let row = state
        .db
        .get_user_by_id(user_id)
        .map_err(|e| AppError::Internal(e.context("identity lookup")))?;

    match row {
        Some(row) => Ok(Some(User {
            id: row.id,
            username: row.username,
        })),
        None => {
            warn!(user_id, "Session refers to a user that no longer exists");
            Ok(None)
        }
    }
}

/// Attach a [`RequestContext`] to every request before any guard or handler runs.
pub async fn load_logged_in_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match run_blocking(move || resolve_identity(&state, &jar)).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(RequestContext { user });
    next.run(req).await
}
