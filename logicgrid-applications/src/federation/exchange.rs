//! Authorization-code exchange

use super::config::FederationConfig;
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// Token endpoint response; only `id_token` is consumed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Trades an authorization code for provider tokens
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn exchange(&self, code: &str) -> ApplicationResult<TokenResponse>;
}

/// [`CodeExchanger`] that posts to the provider's token endpoint
pub struct HttpCodeExchanger {
    client: reqwest::Client,
    config: FederationConfig,
}

impl HttpCodeExchanger {
    pub fn new(config: FederationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CodeExchanger for HttpCodeExchanger {
    async fn exchange(&self, code: &str) -> ApplicationResult<TokenResponse> {
        debug!("Exchanging authorization code at {}", self.config.token_url);

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!("Token request failed: {}", e);
                ApplicationError::Federation {
                    message: "token exchange failed".to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Token endpoint returned {}", status);
            return Err(ApplicationError::Federation {
                message: "token exchange failed".to_string(),
            });
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            error!("Unreadable token response: {}", e);
            ApplicationError::Federation {
                message: "token exchange failed".to_string(),
            }
        })
    }
}
