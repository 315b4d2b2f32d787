//! Protocol handlers
//!
//! `GET` lists or fetches; `POST` saves, publishes or deletes depending on
//! the body.

use crate::auth::ApprovedUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use logicgrid_applications::{CommandOutcome, ListScope, ProtocolRequest};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct ProtocolQuery {
    pub scope: Option<String>,
    pub id: Option<String>,
}

pub async fn get_protocols(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<ProtocolQuery>,
) -> ApiResult<Response> {
    match query.id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => {
            let id = raw
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or(ApiError::InvalidId)?;
            let protocol = state.protocols.fetch(user.id, id).await?;
            Ok(Json(protocol).into_response())
        }
        None => {
            let scope = ListScope::from_query(query.scope.as_deref());
            let protocols = state.protocols.list(user.id, scope).await?;
            Ok(Json(protocols).into_response())
        }
    }
}

pub async fn post_protocol(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    JsonBody(request): JsonBody<ProtocolRequest>,
) -> ApiResult<Response> {
    let command = request.into_command()?;

    let response = match state.protocols.execute(user.id, command).await? {
        CommandOutcome::Deleted => StatusCode::NO_CONTENT.into_response(),
        CommandOutcome::Published { id } => {
            Json(json!({ "ok": true, "id": id, "isPublic": true })).into_response()
        }
        CommandOutcome::Saved(outcome) => {
            Json(json!({ "ok": true, "id": outcome.id() })).into_response()
        }
    };

    Ok(response)
}
