//! Authorization tiers as request extractors
//!
//! Handlers ask for [`ApprovedUser`] or [`AdminUser`]; the gate runs before
//! the handler body, and before any request body is read.

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use logicgrid_applications::{ApplicationError, UserRecord};

/// Authenticated user whose account is approved
#[derive(Debug, Clone)]
pub struct ApprovedUser(pub UserRecord);

/// Approved user with the admin flag
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserRecord);

#[derive(Clone, Copy)]
enum Tier {
    Approved,
    Admin,
}

async fn authorize(parts: &Parts, state: &AppState, tier: Tier) -> Result<UserRecord, Response> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = state.cookies.session_token(&jar);

    let result = match tier {
        Tier::Approved => state.gate.require_approved(token.as_deref()).await,
        Tier::Admin => state.gate.require_admin(token.as_deref()).await,
    };

    result.map_err(|err| match err {
        // The session is gone server-side; drop the cookie too
        ApplicationError::PendingApproval => {
            (state.cookies.clear_session(jar), ApiError::from(err)).into_response()
        }
        other => ApiError::from(other).into_response(),
    })
}

impl<S> FromRequestParts<S> for ApprovedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        authorize(parts, &app_state, Tier::Approved)
            .await
            .map(ApprovedUser)
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        authorize(parts, &app_state, Tier::Admin).await.map(AdminUser)
    }
}
