//! LogicGrid Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebResult};
use axum::serve;
use logicgrid_core::AppConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main LogicGrid web server
pub struct LogicGridServer {
    config: AppConfig,
    state: AppState,
}

impl LogicGridServer {
    /// Open the database and wire every service
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        config.validate()?;
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting LogicGrid web server");
        info!(
            environment = ?self.config.server.environment,
            database = %self.config.database.url,
            federation = self.config.federation.is_some(),
            "Server configuration"
        );

        let app = create_app(self.state.clone());
        let listener = TcpListener::bind(&address).await?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(e.into());
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for LogicGridServer
pub struct LogicGridServerBuilder {
    config: AppConfig,
}

impl LogicGridServerBuilder {
    /// Start from built-in defaults
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database.url = database_url.into();
        self
    }

    /// Configuration the server will be built with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the server
    pub async fn build(self) -> WebResult<LogicGridServer> {
        LogicGridServer::new(self.config).await
    }
}

impl Default for LogicGridServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
