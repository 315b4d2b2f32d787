//! Immutable provider configuration

use crate::{ApplicationError, ApplicationResult};
use logicgrid_core::FederationSettings;
use url::Url;

pub const SCOPES: &str = "openid email profile";

/// Provider endpoints and client credentials, fixed at start-up
#[derive(Debug, Clone)]
pub struct FederationConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: Url,
    pub token_url: Url,
    pub logout_url: Url,
}

impl FederationConfig {
    /// Derive the provider endpoints from its domain
    pub fn from_settings(settings: &FederationSettings) -> ApplicationResult<Self> {
        let base = Url::parse(&format!("https://{}", settings.domain)).map_err(|e| {
            ApplicationError::Federation {
                message: format!("invalid provider domain '{}': {}", settings.domain, e),
            }
        })?;

        let join = |path: &str| {
            base.join(path).map_err(|e| ApplicationError::Federation {
                message: format!("invalid provider endpoint '{}': {}", path, e),
            })
        };

        let authorize_url = join("/authorize")?;
        let token_url = join("/oauth/token")?;
        let mut logout_url = join("/oauth2/default/v1/logout")?;
        logout_url
            .query_pairs_mut()
            .append_pair("post_logout_redirect_uri", &settings.post_logout_redirect_uri);

        Ok(Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            authorize_url,
            token_url,
            logout_url,
        })
    }

    /// Where to send the browser to start a login carrying `state`
    pub fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        url
    }
}
