//! Quota-gated suggestion service

use super::actions::{SuggestRequest, SuggestionResponse};
use crate::users::UserStore;
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use logicgrid_core::{log_operation_error, log_operation_start};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns a free-text prompt and a protocol document into edit actions
#[async_trait]
pub trait ActionSuggester: Send + Sync {
    async fn suggest(&self, prompt: &str, protocol: &Value) -> ApplicationResult<SuggestionResponse>;
}

/// Wraps an [`ActionSuggester`] with the per-account usage limit
#[derive(Clone)]
pub struct SuggestionService {
    users: UserStore,
    suggester: Arc<dyn ActionSuggester>,
    usage_limit: i64,
}

impl SuggestionService {
    pub fn new(users: UserStore, suggester: Arc<dyn ActionSuggester>, usage_limit: i64) -> Self {
        Self {
            users,
            suggester,
            usage_limit,
        }
    }

    /// Run one suggestion for `user_id`, counting it only if it succeeds
    ///
    /// The counter is read and written back as two statements, so concurrent
    /// requests from one account can under-count.
    pub async fn suggest(
        &self,
        user_id: i64,
        request: SuggestRequest,
    ) -> ApplicationResult<SuggestionResponse> {
        log_operation_start!("suggest_actions", user_id);

        let usage = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApplicationError::Unauthenticated)?
            .ai_usage_count;

        if usage >= self.usage_limit {
            warn!(user_id, usage, "Suggestion quota exhausted");
            return Err(ApplicationError::QuotaExceeded {
                message: format!(
                    "Demo limit reached ({} requests max per account).",
                    self.usage_limit
                ),
            });
        }

        if request.prompt.trim().is_empty() {
            return Err(ApplicationError::validation("prompt required"));
        }

        let response = match self
            .suggester
            .suggest(&request.prompt, &request.protocol)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log_operation_error!("suggest_actions", err, user_id);
                return Err(err);
            }
        };

        self.users.set_usage_count(user_id, usage + 1).await?;
        info!(
            user_id,
            usage = usage + 1,
            actions = response.actions.len(),
            "Suggestion served"
        );

        Ok(response)
    }
}
