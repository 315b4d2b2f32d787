//! Federated login handlers

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// 302 Found to `location`
fn found(jar: CookieJar, location: String) -> Response {
    (StatusCode::FOUND, jar, [(header::LOCATION, location)]).into_response()
}

/// Send the browser to the provider with a fresh state cookie
pub async fn federated_login(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    let federation = state
        .federation
        .as_ref()
        .ok_or(ApiError::FederationNotConfigured)?;

    let request = federation.begin();
    let jar = state.cookies.set_state(jar, request.state);

    Ok(found(jar, request.url.to_string()))
}

pub async fn federated_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Response> {
    let federation = state
        .federation
        .as_ref()
        .ok_or(ApiError::FederationNotConfigured)?;

    let stored = state.cookies.state_value(&jar);
    let user = federation
        .complete(stored.as_deref(), query.state.as_deref(), query.code.as_deref())
        .await?;

    let token = state.sessions.issue(user.id).await?;
    info!(user_id = user.id, "Federated login completed");

    let jar = state.cookies.clear_state(jar);
    let jar = state.cookies.set_session(jar, token.into_inner());
    Ok(found(jar, "/".to_string()))
}

/// Clear the local session, then the provider's
pub async fn federated_logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if let Some(token) = state.cookies.session_token(&jar) {
        state.sessions.revoke(&token).await?;
    }
    let jar = state.cookies.clear_session(jar);

    let location = match &state.federation {
        Some(federation) => federation.logout_url().to_string(),
        None => "/".to_string(),
    };
    Ok(found(jar, location))
}
