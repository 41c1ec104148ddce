//! Configuration for the session manager

use jsonwebtoken::Algorithm;
use std::str::FromStr;
use std::time::Duration;

use blog_shared::AppConfig;

use crate::errors::DomainError;

/// Configuration for the session manager
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Token signing secret
    pub jwt_secret: String,
    /// Signing algorithm, HMAC family only
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_seconds: i64,
    /// Upper bound on every credential store call
    pub store_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_ttl_seconds: 15 * 60,
            refresh_ttl_seconds: 7 * 24 * 60 * 60,
            store_timeout: Duration::from_secs(2),
        }
    }
}

impl SessionConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_ttls(mut self, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        self.access_ttl_seconds = access_ttl_seconds;
        self.refresh_ttl_seconds = refresh_ttl_seconds;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Builds the session settings from the application configuration
    pub fn from_app_config(config: &AppConfig) -> Result<Self, DomainError> {
        let jwt = &config.auth.jwt;
        let algorithm = Algorithm::from_str(&jwt.algorithm).map_err(|_| DomainError::Validation {
            message: format!("unsupported signing algorithm '{}'", jwt.algorithm),
        })?;

        Ok(Self {
            jwt_secret: jwt.secret.clone(),
            algorithm,
            access_ttl_seconds: jwt.access_token_expiry,
            refresh_ttl_seconds: jwt.refresh_token_expiry,
            store_timeout: Duration::from_millis(config.cache.operation_timeout_ms),
        })
    }
}
