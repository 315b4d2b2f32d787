//! Application state shared by every handler

use crate::cookies::CookieSettings;
use crate::WebResult;
use logicgrid_applications::{
    AccountService, ActionSuggester, AuthorizationGate, CodeExchanger, CredentialStore, Database,
    FederationConfig, GeminiSuggester, HttpCodeExchanger, IdentityFederation, ProtocolStore,
    SessionManager, SuggestionService, UserStore,
};
use logicgrid_core::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Cloneable handles to every service; no in-process mutable state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cookies: CookieSettings,
    pub sessions: SessionManager,
    pub gate: AuthorizationGate,
    pub accounts: AccountService,
    pub protocols: ProtocolStore,
    pub suggestions: SuggestionService,
    /// Present only when a provider is configured
    pub federation: Option<IdentityFederation>,
}

impl AppState {
    /// Build state with the production collaborators
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        let suggester = Arc::new(GeminiSuggester::new(&config.suggest));
        Self::with_collaborators(config, suggester, None).await
    }

    /// Build state with explicit external collaborators
    ///
    /// Without an `exchanger`, a configured provider is reached over HTTP.
    pub async fn with_collaborators(
        config: AppConfig,
        suggester: Arc<dyn ActionSuggester>,
        exchanger: Option<Arc<dyn CodeExchanger>>,
    ) -> WebResult<Self> {
        let database = Database::open(&config.database.url).await?;
        let pool = database.pool().clone();

        let users = UserStore::new(pool.clone());
        let sessions = SessionManager::new(pool.clone());
        let credentials = CredentialStore::new(config.hashing)?;

        let federation = match &config.federation {
            Some(settings) => {
                let federation_config = FederationConfig::from_settings(settings)?;
                let exchanger = exchanger.unwrap_or_else(|| {
                    Arc::new(HttpCodeExchanger::new(federation_config.clone())) as Arc<dyn CodeExchanger>
                });
                info!("Federated login enabled for {}", settings.domain);
                Some(IdentityFederation::new(
                    federation_config,
                    exchanger,
                    users.clone(),
                ))
            }
            None => None,
        };

        Ok(Self {
            cookies: CookieSettings::from_config(&config),
            gate: AuthorizationGate::new(sessions.clone(), users.clone()),
            accounts: AccountService::new(
                users.clone(),
                sessions.clone(),
                credentials,
                config.signup.auto_approve,
            ),
            protocols: ProtocolStore::new(pool),
            suggestions: SuggestionService::new(users, suggester, config.suggest.usage_limit),
            sessions,
            federation,
            config: Arc::new(config),
        })
    }
}
