//! Credential store configuration

use serde::{Deserialize, Serialize};

/// Backend holding token versions and revoked refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    #[default]
    Redis,
    /// Process-local store, for development and tests only
    Memory,
}

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Which store backs the session manager
    pub backend: CacheType,

    /// Redis connection URL
    pub url: String,

    /// Upper bound for a single store call in milliseconds
    pub operation_timeout_ms: u64,

    /// Maximum connection attempts at startup
    pub max_retries: u32,

    /// Optional namespace for every key
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheType::Redis,
            url: String::from("redis://localhost:6379"),
            operation_timeout_ms: 2000,
            max_retries: 3,
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.backend, CacheType::Redis);
        assert_eq!(config.operation_timeout_ms, 2000);
    }

    #[test]
    fn test_cache_config_with_prefix() {
        let config = CacheConfig::new("redis://cache:6379").with_prefix("blog");
        assert_eq!(config.make_key("user_version:1"), "blog:user_version:1");
    }

    #[test]
    fn test_cache_key_without_prefix() {
        let config = CacheConfig::default();
        assert_eq!(config.make_key("user_version:1"), "user_version:1");
    }
}
