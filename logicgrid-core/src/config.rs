//! Configuration management
//!
//! Layering: built-in defaults, then an optional TOML file, then
//! `LOGICGRID__SECTION__KEY` environment variables.

use crate::error::{ErrorContext, LogicGridError, LogicGridResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deployment environment; production turns on the `Secure` cookie flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    #[serde(alias = "prod")]
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLx connection URL, e.g. `sqlite://logicgrid.db` or `sqlite::memory:`
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://logicgrid.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub state_cookie_name: String,
    /// Lifetime of the federation anti-forgery cookie
    pub state_ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_string(),
            state_cookie_name: "oauth_state".to_string(),
            state_ttl_secs: 600,
        }
    }
}

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashingConfig {
    /// Minimal costs for test suites
    pub fn fast() -> Self {
        Self {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupConfig {
    /// Whether non-bootstrap signups are approved immediately
    pub auto_approve: bool,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self { auto_approve: true }
    }
}

/// External identity provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationSettings {
    /// Provider host, e.g. `example.okta.com`
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub post_logout_redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Successful suggestion calls allowed per account
    pub usage_limit: i64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            usage_limit: 25,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub hashing: HashingConfig,
    pub signup: SignupConfig,
    pub federation: Option<FederationSettings>,
    pub suggest: SuggestConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> LogicGridResult<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| load_error("defaults", e))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let config: AppConfig = builder
            .add_source(
                config::Environment::with_prefix("LOGICGRID")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| load_error("build", e))?
            .try_deserialize()
            .map_err(|e| load_error("deserialize", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> LogicGridResult<String> {
        toml::to_string_pretty(self).map_err(|e| LogicGridError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> LogicGridResult<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be greater than 0"));
        }

        if self.database.url.trim().is_empty() {
            return Err(invalid("database.url must not be empty"));
        }

        if self.hashing.memory_kib == 0
            || self.hashing.iterations == 0
            || self.hashing.parallelism == 0
        {
            return Err(invalid("hashing costs must be greater than 0"));
        }

        if self.session.state_ttl_secs <= 0 {
            return Err(invalid("session.state_ttl_secs must be greater than 0"));
        }

        if let Some(federation) = &self.federation {
            if federation.domain.trim().is_empty() || federation.client_id.trim().is_empty() {
                return Err(invalid(
                    "federation.domain and federation.client_id are required when federation is configured",
                ));
            }
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }

    /// Server bind address
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn load_error(operation: &str, e: config::ConfigError) -> LogicGridError {
    LogicGridError::Config {
        message: format!("Failed to load config: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("config")
            .with_operation(operation)
            .with_suggestion("Check TOML syntax and LOGICGRID__* variables"),
    }
}

fn invalid(message: &str) -> LogicGridError {
    crate::config_error!(message, "config")
}
