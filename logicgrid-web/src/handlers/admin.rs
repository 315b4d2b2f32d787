//! Administrator user-management handlers

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::AppState;
use axum::{extract::State, response::Json};
use logicgrid_applications::{ResetPasswordRequest, TargetUserRequest, UserSummary};
use serde_json::{json, Value};

fn acknowledged(user_id: i64) -> Json<Value> {
    Json(json!({ "ok": true, "userId": user_id }))
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.accounts.list_users().await?))
}

pub async fn promote_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(request): JsonBody<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    Ok(acknowledged(state.accounts.promote(request).await?))
}

pub async fn demote_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(request): JsonBody<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    Ok(acknowledged(state.accounts.demote(admin.id, request).await?))
}

pub async fn approve_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(request): JsonBody<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    Ok(acknowledged(state.accounts.approve(request).await?))
}

pub async fn unapprove_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(request): JsonBody<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    Ok(acknowledged(state.accounts.unapprove(admin.id, request).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(request): JsonBody<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    Ok(acknowledged(state.accounts.delete_user(admin.id, request).await?))
}

pub async fn reset_password(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    Ok(acknowledged(state.accounts.reset_password(request).await?))
}
