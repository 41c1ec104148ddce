//! # Infrastructure Layer
//!
//! Concrete adapters for the blog API core. The only external system the
//! session lifecycle depends on is a key-value store with atomic increment
//! and insert-if-absent, provided here by Redis.
//!
//! ## Architecture
//!
//! - **Cache**: Redis client with connection retry and the Redis-backed
//!   [`CredentialStore`](blog_core::CredentialStore)

use blog_core::errors::DomainError;

/// Cache module - Redis client and credential store
pub mod cache;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data that cannot be interpreted
    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Store {
            message: err.to_string(),
        }
    }
}
