//! Application factory: state, routes and layers.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use flaskr_db::Database;

use crate::config::Config;
use crate::error::AppError;
use crate::guard::{self, GuardChain, RequireIdentity, SameOrigin};
use crate::middleware::load_logged_in_user;
use crate::session::SessionManager;
use crate::{auth, blog};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session: SessionManager,
}

/// Open the database (creating its parent directory) and build shared state.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    if let Some(dir) = config.database.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::open(&config.database)?;

    Ok(Arc::new(AppStateInner {
        db,
        session: SessionManager::from_config(config),
    }))
}

pub fn create_app(config: &Config) -> anyhow::Result<Router> {
    let state = build_state(config)?;
    let same_origin = config
        .allowed_origin
        .as_deref()
        .map(SameOrigin::new)
        .transpose()?;

    if let Some(origin) = &config.allowed_origin {
        info!("Cross-origin writes rejected unless Origin is {}", origin);
    }
    Ok(router(state, same_origin))
}

pub fn router(state: AppState, same_origin: Option<SameOrigin>) -> Router {
    let login_required = GuardChain::new().with(RequireIdentity);

    let protected_routes = Router::new()
        .route("/create", get(blog::create_form).post(blog::create))
        .route("/{id}/update", get(blog::update_form).post(blog::update))
        .route("/{id}/delete", post(blog::delete))
        .route_layer(middleware::from_fn_with_state(login_required, guard::enforce));

    let public_routes = Router::new()
        .route("/", get(blog::index))
        .route("/hello", get(hello))
        .route("/auth/register", get(auth::register_form).post(auth::register))
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/logout", get(auth::logout));

    let mut app = Router::new().merge(public_routes).merge(protected_routes);

    if let Some(same_origin) = same_origin {
        let csrf = GuardChain::new().with(same_origin);
        app = app.layer(middleware::from_fn_with_state(csrf, guard::enforce));
    }

    app.layer(middleware::from_fn_with_state(state.clone(), load_logged_in_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Hello, World!"
}

/// Run blocking store/hash work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        AppError::Internal(anyhow!("blocking task failed: {e}"))
    })?
}
