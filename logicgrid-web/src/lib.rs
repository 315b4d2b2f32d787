//! LogicGrid Web Server
//!
//! axum surface over the application services: account and admin
//! endpoints, shared protocols, federated login and the suggestion quota.

pub mod auth;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod security;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{LogicGridServer, LogicGridServerBuilder};
pub use state::AppState;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use logicgrid_applications::ApplicationError;
use logicgrid_core::LogicGridError;
use tower_http::trace::TraceLayer;

/// Largest request body accepted by any endpoint
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::account_routes())
        .nest("/admin", routes::admin_routes())
        .nest("/api", routes::api_routes())
        .merge(routes::federation_routes())
        .layer(middleware::from_fn(security::security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] LogicGridError),

    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
