//! HTML pages, rendered from templates bundled into the binary.

use std::sync::LazyLock;

use axum::response::{Html, IntoResponse, Response};
use minijinja::{Environment, Value, context};

use crate::context::RequestContext;
use crate::error::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("auth/register.html", include_str!("../templates/auth/register.html")),
    ("auth/login.html", include_str!("../templates/auth/login.html")),
    ("blog/index.html", include_str!("../templates/blog/index.html")),
    ("blog/create.html", include_str!("../templates/blog/create.html")),
    ("blog/update.html", include_str!("../templates/blog/update.html")),
];

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)
            .expect("bundled template failed to parse");
    }
    env
});

pub fn render(name: &str, ctx: Value) -> Result<Html<String>, AppError> {
    let template = ENV.get_template(name).map_err(anyhow::Error::from)?;
    let html = template.render(ctx).map_err(anyhow::Error::from)?;
    Ok(Html(html))
}

/// Render a page for the request's identity, with optional extra context.
pub fn page(name: &str, req: &RequestContext, extra: Value) -> Result<Html<String>, AppError> {
    render(
        name,
        context! { user => req.user, messages => Vec::<String>::new(), ..extra },
    )
}

/// Re-render a form with the error flashed above it.
pub fn form_error(name: &str, req: &RequestContext, err: AppError, extra: Value) -> Response {
    let status = err.status();
    let message = err.to_string();
    match render(
        name,
        context! { user => req.user, messages => vec![message], ..extra },
    ) {
        Ok(html) => (status, html).into_response(),
        Err(e) => e.into_response(),
    }
}
