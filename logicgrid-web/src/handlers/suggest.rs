//! Action suggestion handler

use crate::auth::ApprovedUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::AppState;
use axum::{extract::State, response::Json};
use logicgrid_applications::{SuggestRequest, SuggestionResponse};

pub async fn suggest_actions(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    JsonBody(request): JsonBody<SuggestRequest>,
) -> ApiResult<Json<SuggestionResponse>> {
    Ok(Json(state.suggestions.suggest(user.id, request).await?))
}
