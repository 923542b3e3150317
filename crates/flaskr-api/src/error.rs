use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minijinja::context;
use thiserror::Error;
use tracing::error;

use flaskr_types::PostId;

use crate::pages;

/// Everything a request can fail with. The `Display` text is what the user
/// sees, so it doubles as the flash message for form errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("User {0} is already registered.")]
    DuplicateUsername(String),

    #[error("Incorrect username.")]
    UnknownUser,

    #[error("Incorrect password.")]
    WrongPassword,

    #[error("Post id {0} doesn't exist.")]
    NotFound(PostId),

    #[error("You can only change your own posts.")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername(_) => StatusCode::CONFLICT,
            AppError::UnknownUser | AppError::WrongPassword => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Errors that are shown on the form that caused them.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::DuplicateUsername(_)
                | AppError::UnknownUser
                | AppError::WrongPassword
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "An internal server error occurred.".to_string()
            }
            other => other.to_string(),
        };

        let ctx = context! {
            code => status.as_u16(),
            reason => status.canonical_reason().unwrap_or("Error"),
            message => message.as_str(),
        };
        match pages::render("error.html", ctx) {
            Ok(html) => (status, html).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}
