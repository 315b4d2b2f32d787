//! Signup, login, logout and self-service account handlers

use crate::auth::ApprovedUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::AppState;
use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use logicgrid_applications::{ChangePasswordRequest, LoginRequest, SignupRequest, UserInfo};
use serde_json::{json, Value};

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<SignupRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let outcome = state.accounts.signup(request).await?;

    let jar = match outcome.session {
        Some(token) => state.cookies.set_session(jar, token.into_inner()),
        None => jar,
    };

    Ok((
        jar,
        Json(json!({
            "ok": true,
            "userId": outcome.user_id,
            "autoLogin": outcome.auto_login,
            "is_admin": outcome.is_admin,
            "is_approved": outcome.is_approved,
            "pendingApproval": !outcome.auto_login,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let outcome = state.accounts.login(request).await?;
    let jar = state.cookies.set_session(jar, outcome.session.into_inner());

    Ok((
        jar,
        Json(json!({
            "ok": true,
            "userId": outcome.user_id,
            "is_approved": true,
        })),
    ))
}

/// Destroy the caller's session, if any
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Value>)> {
    if let Some(token) = state.cookies.session_token(&jar) {
        state.sessions.revoke(&token).await?;
    }

    Ok((state.cookies.clear_session(jar), Json(json!({ "ok": true }))))
}

pub async fn me(State(state): State<AppState>, ApprovedUser(user): ApprovedUser) -> Json<UserInfo> {
    Json(state.accounts.me(&user))
}

pub async fn change_password(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    jar: CookieJar,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let token = state.accounts.change_password(user.id, request).await?;
    let jar = state.cookies.set_session(jar, token.into_inner());

    Ok((jar, Json(json!({ "ok": true }))))
}
