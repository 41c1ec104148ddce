//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing, lifetimes and the refresh cookie
//! - `cache` - Credential store backend and Redis connection
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server binding
//!
//! Values are layered: built-in defaults, then `<dir>/<env>.yaml`, then
//! `APP_`-prefixed environment variables (`__` separates nested keys, e.g.
//! `APP_AUTH__JWT__SECRET`).

pub mod auth;
pub mod cache;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, RefreshCookieConfig};
pub use cache::{CacheConfig, CacheType};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Errors raised while assembling the application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Credential store configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, `<dir>/<env>.yaml` and the process environment
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = Environment::from_env();
        let file = dir.as_ref().join(environment.to_string());
        let file = file.to_string_lossy();

        let settings = ::config::Config::builder()
            .set_default("environment", environment.to_string())?
            .set_default("logging.level", LoggingConfig::for_environment(environment).level)?
            .add_source(::config::File::with_name(&file).required(false))
            .add_source(
                ::config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that must never reach a running server
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err(ConfigError::Invalid(
                "auth.jwt.secret must be set in production".to_string(),
            ));
        }
        if self.auth.jwt.access_token_expiry <= 0 || self.auth.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Invalid(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.auth.jwt.access_token_expiry > self.auth.jwt.refresh_token_expiry {
            return Err(ConfigError::Invalid(
                "access token must not outlive the refresh token".to_string(),
            ));
        }
        Ok(())
    }
}
