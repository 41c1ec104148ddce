//! Cache module for Redis-based session state
//!
//! This module provides the Redis client with connection retry and the
//! credential store holding token versions and revoked refresh tokens.

pub mod credential_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use credential_store::RedisCredentialStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use blog_shared::config::CacheConfig;
