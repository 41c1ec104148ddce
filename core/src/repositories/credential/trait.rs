//! Versioned credential store contract.
//!
//! The store owns the only mutable session state: a monotonic version counter
//! per subject and a time-bounded set of revoked refresh tokens. It is the
//! only component allowed to mutate either.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::DomainError;

/// Repository trait for token versions and the refresh token blacklist
///
/// Implementations must make `increment_version` and `try_add_to_blacklist`
/// atomic under concurrent callers using a primitive of the backing store,
/// never a read-modify-write in the application.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current version of a subject, `0` when nothing is stored
    async fn get_version(&self, user_id: u64) -> Result<u64, DomainError>;

    /// Atomically increments the subject's version and returns the new value
    ///
    /// An absent counter is created at `1`.
    async fn increment_version(&self, user_id: u64) -> Result<u64, DomainError>;

    /// Whether the serialized token is currently revoked
    async fn is_blacklisted(&self, token: &str) -> Result<bool, DomainError>;

    /// Revokes the token for `ttl_seconds`
    ///
    /// A non-positive ttl is a no-op: the token is already past its expiry.
    async fn add_to_blacklist(&self, token: &str, ttl_seconds: i64) -> Result<(), DomainError>;

    /// Revokes the token only if it is not revoked yet
    ///
    /// Returns `true` when this call inserted the entry and `false` when
    /// another caller got there first. A non-positive ttl writes nothing and
    /// returns `true`.
    async fn try_add_to_blacklist(
        &self,
        token: &str,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn get_version(&self, user_id: u64) -> Result<u64, DomainError> {
        (**self).get_version(user_id).await
    }

    async fn increment_version(&self, user_id: u64) -> Result<u64, DomainError> {
        (**self).increment_version(user_id).await
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, DomainError> {
        (**self).is_blacklisted(token).await
    }

    async fn add_to_blacklist(&self, token: &str, ttl_seconds: i64) -> Result<(), DomainError> {
        (**self).add_to_blacklist(token, ttl_seconds).await
    }

    async fn try_add_to_blacklist(
        &self,
        token: &str,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError> {
        (**self).try_add_to_blacklist(token, ttl_seconds).await
    }
}
