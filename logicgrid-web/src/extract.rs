//! Strict JSON body extractor

use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON request body with the server's input rules applied
///
/// - a `Content-Type` other than `application/json` is rejected with 415;
///   a missing one is accepted
/// - bodies over the router's size limit and malformed JSON are rejected
///   with 400
/// - unknown fields are rejected by the target types themselves
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(CONTENT_TYPE) {
            let is_json = content_type
                .to_str()
                .map(|value| value.starts_with("application/json"))
                .unwrap_or(false);
            if !is_json {
                return Err(ApiError::UnsupportedMediaType);
            }
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!("Rejected request body: {}", rejection);
            ApiError::InvalidJson
        })?;

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            debug!("Invalid JSON body: {}", e);
            ApiError::InvalidJson
        })?;

        Ok(JsonBody(value))
    }
}
