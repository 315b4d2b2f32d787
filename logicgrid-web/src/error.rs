//! HTTP error responses
//!
//! Every failure leaves the server as `{"error": code, "message": text}`.
//! Internal detail is logged and never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use logicgrid_applications::ApplicationError;
use serde_json::json;
use tracing::error;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    #[error("invalid JSON")]
    InvalidJson,

    #[error("invalid id")]
    InvalidId,

    #[error("federation not configured")]
    FederationNotConfigured,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        use ApplicationError as E;

        match self {
            ApiError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                self.to_string(),
            ),
            ApiError::InvalidJson => (StatusCode::BAD_REQUEST, "invalid_json", self.to_string()),
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, "invalid_id", self.to_string()),
            ApiError::FederationNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "federation_not_configured",
                self.to_string(),
            ),
            ApiError::Application(err) => match err {
                E::Validation { message } => {
                    (StatusCode::BAD_REQUEST, "validation_error", message.clone())
                }
                E::DuplicateEmail => (StatusCode::BAD_REQUEST, "duplicate_email", err.to_string()),
                E::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "invalid_credentials",
                    err.to_string(),
                ),
                E::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthorized", err.to_string()),
                E::IncorrectPassword => (
                    StatusCode::UNAUTHORIZED,
                    "incorrect_password",
                    err.to_string(),
                ),
                E::InvalidState => (StatusCode::UNAUTHORIZED, "invalid_state", err.to_string()),
                E::AccountLocked => (StatusCode::FORBIDDEN, "account_locked", err.to_string()),
                E::PendingApproval => (StatusCode::FORBIDDEN, "pending_approval", err.to_string()),
                E::Forbidden { message } => (StatusCode::FORBIDDEN, "forbidden", message.clone()),
                E::NotFound { message } => (StatusCode::NOT_FOUND, "not_found", message.clone()),
                E::Conflict { message } => (StatusCode::CONFLICT, "conflict", message.clone()),
                E::QuotaExceeded { message } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "quota_exceeded",
                    message.clone(),
                ),
                E::Suggestion { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "suggestion_error",
                    "AI error".to_string(),
                ),
                E::Federation { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "federation_error",
                    "federation login failed".to_string(),
                ),
                E::Hashing { .. } | E::Core(_) | E::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    INTERNAL_MESSAGE.to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        match &self {
            ApiError::Application(ApplicationError::Core(core)) => core.log(),
            _ if status.is_server_error() => error!(error = %self, code, "Request failed"),
            _ => {}
        }

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
