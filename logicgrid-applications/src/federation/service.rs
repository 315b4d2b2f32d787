//! Federated login flow

use super::config::FederationConfig;
use super::exchange::CodeExchanger;
use super::id_token::email_from_id_token;
use crate::session::generate_token;
use crate::users::{NewUser, UserRecord, UserStore};
use crate::{ApplicationError, ApplicationResult};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// A login redirect and the state value that must come back with it
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub state: String,
    pub url: Url,
}

/// Maps provider identities onto local users
#[derive(Clone)]
pub struct IdentityFederation {
    config: FederationConfig,
    exchanger: Arc<dyn CodeExchanger>,
    users: UserStore,
}

impl IdentityFederation {
    pub fn new(
        config: FederationConfig,
        exchanger: Arc<dyn CodeExchanger>,
        users: UserStore,
    ) -> Self {
        Self {
            config,
            exchanger,
            users,
        }
    }

    /// Fresh anti-forgery state and the provider URL carrying it
    pub fn begin(&self) -> AuthorizationRequest {
        let state = generate_token();
        let url = self.config.authorization_url(&state);
        AuthorizationRequest { state, url }
    }

    /// Finish a login from the provider's callback parameters
    ///
    /// The state check happens before any network traffic.
    pub async fn complete(
        &self,
        stored_state: Option<&str>,
        returned_state: Option<&str>,
        code: Option<&str>,
    ) -> ApplicationResult<UserRecord> {
        match (stored_state, returned_state) {
            (Some(stored), Some(returned))
                if !stored.is_empty() && !returned.is_empty() && stored == returned => {}
            _ => {
                warn!("Federation callback with missing or mismatched state");
                return Err(ApplicationError::InvalidState);
            }
        }

        let code = code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| ApplicationError::validation("code required"))?;

        let tokens = self.exchanger.exchange(code).await?;
        let id_token = tokens.id_token.ok_or_else(|| ApplicationError::Federation {
            message: "no id_token".to_string(),
        })?;
        let email = email_from_id_token(&id_token)?;

        self.find_or_create_user(&email).await
    }

    /// Existing user for `email`, or a new approved non-admin one
    ///
    /// An existing password account with the same email is adopted as-is;
    /// there is no separate linking confirmation.
    pub async fn find_or_create_user(&self, email: &str) -> ApplicationResult<UserRecord> {
        if let Some(user) = self.users.find_by_email(email).await? {
            return Ok(user);
        }

        let created = self
            .users
            .insert(&NewUser {
                email: email.to_string(),
                password_hash: String::new(),
                is_admin: false,
                is_approved: true,
            })
            .await;

        let id = match created {
            Ok(id) => {
                info!(user_id = id, "Created user from federated login");
                id
            }
            // Lost a race with a concurrent first login for the same email
            Err(ApplicationError::DuplicateEmail) => {
                return self
                    .users
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("user not found"));
            }
            Err(e) => return Err(e),
        };

        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("user not found"))
    }

    pub fn logout_url(&self) -> &Url {
        &self.config.logout_url
    }
}
