//! Per-request identity.
//!
//! The identity loader stores a [`RequestContext`] in the request extensions;
//! handlers read it through these extractors instead of any shared state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};

use flaskr_types::models::User;

use crate::error::AppError;

pub const LOGIN_PATH: &str = "/auth/login";

/// Identity resolved for the current request, `None` for anonymous clients.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<User>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("identity loader is not installed")))
    }
}

/// The resolved user of a request that must be logged in. Rejects with the
/// same redirect as the login guard when no identity is present.
#[derive(Debug, Clone)]
pub struct Identity(pub User);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        ctx.user
            .map(Identity)
            .ok_or_else(|| Redirect::to(LOGIN_PATH).into_response())
    }
}
