//! Guards evaluated before dispatch.
//!
//! A [`GuardChain`] is an explicit, ordered list of predicates installed as a
//! route layer with [`enforce`]. The first guard that denies short-circuits
//! the request with its response; the wrapped handler never runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::context::{LOGIN_PATH, RequestContext};

pub enum Verdict {
    Allow,
    Deny(Response),
}

pub trait Guard: Send + Sync {
    fn check(&self, parts: &Parts, ctx: &RequestContext) -> Verdict;
}

#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    pub fn evaluate(&self, parts: &Parts, ctx: &RequestContext) -> Verdict {
        for guard in &self.guards {
            if let Verdict::Deny(resp) = guard.check(parts, ctx) {
                return Verdict::Deny(resp);
            }
        }
        Verdict::Allow
    }
}

/// Middleware running a [`GuardChain`] against the request's context.
pub async fn enforce(State(chain): State<GuardChain>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    // No context means the identity loader didn't run: treat as anonymous
    let ctx = parts
        .extensions
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    match chain.evaluate(&parts, &ctx) {
        Verdict::Allow => next.run(Request::from_parts(parts, body)).await,
        Verdict::Deny(resp) => resp,
    }
}

/// Redirects anonymous requests to the login page.
pub struct RequireIdentity;

impl Guard for RequireIdentity {
    fn check(&self, parts: &Parts, ctx: &RequestContext) -> Verdict {
        if ctx.user.is_some() {
            return Verdict::Allow;
        }
        debug!(path = %parts.uri.path(), "Anonymous request redirected to login");
        Verdict::Deny(Redirect::to(LOGIN_PATH).into_response())
    }
}

/// Rejects state-changing requests whose `Origin` header names a different
/// site. Requests without an `Origin` header pass.
pub struct SameOrigin {
    allowed: HeaderValue,
}

impl SameOrigin {
    pub fn new(origin: &str) -> anyhow::Result<Self> {
        Ok(Self {
            allowed: HeaderValue::from_str(origin.trim_end_matches('/'))?,
        })
    }
}

impl Guard for SameOrigin {
    fn check(&self, parts: &Parts, _ctx: &RequestContext) -> Verdict {
        if parts.method.is_safe() {
            return Verdict::Allow;
        }
        match parts.headers.get(header::ORIGIN) {
            Some(origin) if origin != &self.allowed => {
                debug!(?origin, "Cross-origin request rejected");
                Verdict::Deny((StatusCode::FORBIDDEN, "Cross-origin request rejected.").into_response())
            }
            _ => Verdict::Allow,
        }
    }
}
