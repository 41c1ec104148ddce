//! Redis-backed credential store
//!
//! Key layout:
//! - `user_version:<id>` holds the decimal version counter, no expiry
//! - `jwt_refresh:<token>` holds `"revoked"` until the token would expire
//! - `user_id_seq` hands out subject ids, no expiry
//!
//! Both are namespaced by the configured key prefix when one is set.

use async_trait::async_trait;
use tracing::{debug, error};

use blog_core::errors::DomainError;
use blog_core::repositories::credential::keys::{
    blacklist_key, version_key, REVOKED_SENTINEL, USER_ID_SEQUENCE_KEY,
};
use blog_core::repositories::{CredentialStore, UserIdSequence};

use crate::cache::{CacheConfig, RedisClient};
use crate::InfrastructureError;

/// Credential store on top of [`RedisClient`]
///
/// Increments use `INCR` and conditional revocation uses `SET NX EX`, so
/// both stay atomic across every server instance sharing the Redis.
#[derive(Clone)]
pub struct RedisCredentialStore {
    client: RedisClient,
}

impl RedisCredentialStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connects to Redis and wraps the client
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Ok(Self::new(RedisClient::new(config).await?))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

/// Parses a stored version counter
///
/// A value that is not a non-negative integer is reported, never read as 0:
/// silently resetting a version would revive revoked tokens.
pub(crate) fn parse_version(user_id: u64, raw: &str) -> Result<u64, InfrastructureError> {
    raw.trim().parse::<u64>().map_err(|_| {
        InfrastructureError::Corrupt(format!("version of user {} is not a counter", user_id))
    })
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn get_version(&self, user_id: u64) -> Result<u64, DomainError> {
        let raw = self.client.get(&self.key(&version_key(user_id))).await?;
        match raw {
            Some(raw) => parse_version(user_id, &raw).map_err(|e| {
                error!("{}", e);
                DomainError::from(e)
            }),
            None => Ok(0),
        }
    }

    async fn increment_version(&self, user_id: u64) -> Result<u64, DomainError> {
        let version = self
            .client
            .increment(&self.key(&version_key(user_id)), None)
            .await?;

        u64::try_from(version).map_err(|_| {
            DomainError::from(InfrastructureError::Corrupt(format!(
                "version of user {} went negative",
                user_id
            )))
        })
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.key(&blacklist_key(token))).await?)
    }

    async fn add_to_blacklist(&self, token: &str, ttl_seconds: i64) -> Result<(), DomainError> {
        if ttl_seconds <= 0 {
            debug!("Skipping blacklist write for already expired token");
            return Ok(());
        }

        self.client
            .set_with_expiry(
                &self.key(&blacklist_key(token)),
                REVOKED_SENTINEL,
                ttl_seconds as u64,
            )
            .await?;
        Ok(())
    }

    async fn try_add_to_blacklist(
        &self,
        token: &str,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError> {
        if ttl_seconds <= 0 {
            debug!("Skipping blacklist write for already expired token");
            return Ok(true);
        }

        Ok(self
            .client
            .set_if_absent_with_expiry(
                &self.key(&blacklist_key(token)),
                REVOKED_SENTINEL,
                ttl_seconds as u64,
            )
            .await?)
    }
}

#[async_trait]
impl UserIdSequence for RedisCredentialStore {
    async fn next_user_id(&self) -> Result<u64, DomainError> {
        let id = self
            .client
            .increment(&self.key(USER_ID_SEQUENCE_KEY), None)
            .await?;

        u64::try_from(id).map_err(|_| {
            DomainError::from(InfrastructureError::Corrupt(
                "user id sequence went negative".to_string(),
            ))
        })
    }
}
