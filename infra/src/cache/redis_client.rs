//! Redis cache client implementation
//!
//! This module provides a Redis client over a multiplexed connection with
//! retry logic and the handful of primitives the credential store needs:
//! plain and conditional set with expiry, get, atomic increment, existence
//! and TTL lookups.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

/// Base delay between retries, doubled per attempt
const DEFAULT_RETRY_DELAY_MS: u64 = 100;
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis cache client with connection retry
///
/// Cloning is cheap: clones share the multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of attempts per operation
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connects using the attempt budget from `config`
    ///
    /// # Example
    /// ```no_run
    /// use blog_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("blog");
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let max_retries = config.max_retries.max(1);
        Self::new_with_retry_config(config, max_retries, DEFAULT_RETRY_DELAY_MS).await
    }

    /// Create a new Redis client with custom retry configuration
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, max_retries, retry_delay_ms).await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value that expires after `expiry_seconds`
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting '{}' key with expiry {}s", key_namespace(key), expiry_seconds);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();

            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to set '{}' key: {}", key_namespace(key), e);
            InfrastructureError::Cache(e)
        })
    }

    /// Set a value with expiry only if the key does not exist yet
    ///
    /// Single `SET key value NX EX ttl` round trip, never retried. Returns
    /// `true` when this call created the key.
    pub async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        debug!(
            "Conditionally setting '{}' key with expiry {}s",
            key_namespace(key),
            expiry_seconds
        );

        let result = self
            .execute_once(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();

                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("NX")
                        .arg("EX")
                        .arg(expiry_seconds)
                        .query_async::<_, Option<String>>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(reply) => {
                let created = reply.is_some();
                debug!("Conditional set on '{}' key created: {}", key_namespace(key), created);
                Ok(created)
            }
            Err(e) => {
                error!("Failed to conditionally set '{}' key: {}", key_namespace(key), e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get a value from cache, `None` when absent or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting '{}' key", key_namespace(key));

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to get '{}' key: {}", key_namespace(key), e);
            InfrastructureError::Cache(e)
        })
    }

    /// Delete a key, `true` if it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting '{}' key", key_namespace(key));

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.del::<_, u32>(key).await })
        })
        .await
        .map(|deleted| deleted > 0)
        .map_err(|e| {
            error!("Failed to delete '{}' key: {}", key_namespace(key), e);
            InfrastructureError::Cache(e)
        })
    }

    /// Atomically increment a counter, creating it at 1
    ///
    /// The optional expiry is applied on the first increment only. Sent once:
    /// a transient failure is returned rather than risking a double increment.
    pub async fn increment(
        &self,
        key: &str,
        expiry_seconds: Option<u64>,
    ) -> Result<i64, InfrastructureError> {
        debug!("Incrementing '{}' counter", key_namespace(key));

        let result = self
            .execute_once(|mut conn| {
                let key = key.to_string();

                Box::pin(async move {
                    let count: i64 = conn.incr(&key, 1).await?;

                    if count == 1 {
                        if let Some(ttl) = expiry_seconds {
                            conn.expire::<_, ()>(&key, ttl as i64).await?;
                        }
                    }

                    Ok(count)
                })
            })
            .await;

        match result {
            Ok(count) => {
                debug!("Counter '{}' incremented to {}", key_namespace(key), count);
                Ok(count)
            }
            Err(e) => {
                error!("Failed to increment '{}' counter: {}", key_namespace(key), e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if a key exists in cache
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to check '{}' key existence: {}", key_namespace(key), e);
            InfrastructureError::Cache(e)
        })
    }

    /// Remaining time-to-live of a key
    ///
    /// `None` if the key doesn't exist or has no expiry.
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Failed to get TTL for '{}' key: {}", key_namespace(key), e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if the Redis connection is healthy with a PING
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move {
                    redis::cmd("PING").query_async::<_, String>(&mut conn).await
                })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute an idempotent Redis operation, retrying transient failures
    /// with exponential backoff
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        run_with_backoff(&self.connection, self.max_retries, self.retry_delay_ms, operation).await
    }

    /// Execute a non-idempotent Redis operation exactly once
    ///
    /// A reply lost after the server applied the write would make a retry
    /// apply it twice, so transient failures are returned to the caller.
    async fn execute_once<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        run_with_backoff(&self.connection, 1, self.retry_delay_ms, operation).await
    }
}

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Runs `operation` up to `max_attempts` times while it fails transiently
pub(crate) async fn run_with_backoff<C, F, T>(
    connection: &C,
    max_attempts: u32,
    retry_delay_ms: u64,
    operation: F,
) -> RedisResult<T>
where
    C: Clone,
    F: Fn(C) -> RedisFuture<T>,
{
    let mut attempts = 0;
    let mut delay = retry_delay_ms;

    loop {
        attempts += 1;

        match operation(connection.clone()).await {
            Ok(result) => return Ok(result),
            Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                warn!(
                    "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                    attempts, max_attempts, e, delay
                );
                sleep(Duration::from_millis(delay)).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Check if a Redis error is transient and the operation worth retrying
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}

/// Key without its last segment
///
/// Blacklist keys end in a bearer token, which must never reach the logs.
pub(crate) fn key_namespace(key: &str) -> &str {
    key.rsplit_once(':').map(|(namespace, _)| namespace).unwrap_or("<root>")
}
