//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)
//!
//! The GitHub client id and secret are environment-supplied
//! (`PHOTON__AUTH__GITHUB__CLIENT_ID` / `...__CLIENT_SECRET`) and are
//! never logged or returned to clients.

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

/// Authentication configuration (GitHub OAuth)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub github: GitHubOAuthConfig,
}

/// GitHub OAuth endpoints and credentials
///
/// The endpoint URLs default to GitHub production and are overridable
/// so integration tests can point the client at a stub provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Authorization page the browser is redirected to on sign-in
    pub authorize_url: String,
    /// Token endpoint for the code exchange
    pub token_url: String,
    /// User-info endpoint for identity resolution
    pub user_url: String,
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds (default: 86400 = 24h).
    /// Applied to both the store entry and the cookie max-age.
    pub ttl_seconds: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (PHOTON_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default(
                "auth.github.authorize_url",
                "https://github.com/login/oauth/authorize",
            )?
            .set_default(
                "auth.github.token_url",
                "https://github.com/login/oauth/access_token",
            )?
            .set_default("auth.github.user_url", "https://api.github.com/user")?
            .set_default("session.ttl_seconds", 86_400)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (PHOTON_*)
            .add_source(
                Environment::with_prefix("PHOTON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.auth.github.client_id.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.github.client_id must not be empty".to_string(),
            ));
        }

        if self.auth.github.client_secret.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.github.client_secret must not be empty".to_string(),
            ));
        }

        for (key, value) in [
            ("auth.github.authorize_url", &self.auth.github.authorize_url),
            ("auth.github.token_url", &self.auth.github.token_url),
            ("auth.github.user_url", &self.auth.github.user_url),
        ] {
            if let Err(error) = url::Url::parse(value) {
                return Err(crate::error::AppError::Config(format!(
                    "{key} is not a valid URL: {error}"
                )));
            }
        }

        if self.session.ttl_seconds <= 0 {
            return Err(crate::error::AppError::Config(
                "session.ttl_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
