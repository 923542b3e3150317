pub mod app;
pub mod auth;
pub mod blog;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod pages;
pub mod password;
pub mod posts;
pub mod session;

pub use app::{AppState, AppStateInner, build_state, create_app, router};
pub use config::Config;
pub use error::AppError;
