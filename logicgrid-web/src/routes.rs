//! Route definitions for the LogicGrid web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Signup, login and self-service account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        .route("/change-password", post(handlers::change_password))
}

/// Administrator routes, mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/promote", post(handlers::promote_user))
        .route("/demote", post(handlers::demote_user))
        .route("/approve", post(handlers::approve_user))
        .route("/unapprove", post(handlers::unapprove_user))
        .route("/delete-user", post(handlers::delete_user))
        .route("/reset-password", post(handlers::reset_password))
}

/// JSON API routes, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/protocols",
            get(handlers::get_protocols).post(handlers::post_protocol),
        )
        .route("/ai/suggest", post(handlers::suggest_actions))
}

/// Redirect-based federated login routes
pub fn federation_routes() -> Router<AppState> {
    Router::new()
        .route("/login/ext", get(handlers::federated_login))
        .route("/oauth/callback", get(handlers::federated_callback))
        .route("/logout/ext", get(handlers::federated_logout))
}
