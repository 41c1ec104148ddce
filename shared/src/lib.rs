//! Shared configuration and error payloads for the blog API server
//!
//! This crate provides common functionality used across all server modules:
//! - Layered application configuration
//! - Error response structures and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CacheType, ConfigError, Environment, JwtConfig, LogFormat,
    LoggingConfig, RefreshCookieConfig, ServerConfig, AuthConfig,
};
pub use errors::{error_codes, ErrorResponse};
