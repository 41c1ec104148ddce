//! Credential store doubles for failure and concurrency tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use crate::errors::DomainError;
use crate::repositories::{CredentialStore, InMemoryCredentialStore};
use crate::services::token::Clock;

/// Clock that moves forward by `step` seconds after every reading
///
/// Models wall time passing between the steps of one operation.
pub struct TickingClock {
    pub now: AtomicI64,
    pub step: AtomicI64,
}

impl TickingClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
            step: AtomicI64::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> i64 {
        self.now.fetch_add(self.step.load(Ordering::SeqCst), Ordering::SeqCst)
    }
}

/// In-memory store with switchable faults
///
/// Every call first yields to the scheduler, so concurrent callers
/// interleave between store operations the way they would against a
/// remote store.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryCredentialStore,
    pub fail_reads: AtomicBool,
    pub fail_increment: AtomicBool,
    pub fail_blacklist_add: AtomicBool,
    pub delay_ms: AtomicU64,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn before_call(&self, fail: &AtomicBool, operation: &str) -> Result<(), DomainError> {
        tokio::task::yield_now().await;

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if fail.load(Ordering::SeqCst) {
            return Err(DomainError::Store {
                message: format!("{} unavailable", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FaultyStore {
    async fn get_version(&self, user_id: u64) -> Result<u64, DomainError> {
        self.before_call(&self.fail_reads, "get_version").await?;
        self.inner.get_version(user_id).await
    }

    async fn increment_version(&self, user_id: u64) -> Result<u64, DomainError> {
        self.before_call(&self.fail_increment, "increment_version").await?;
        self.inner.increment_version(user_id).await
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, DomainError> {
        self.before_call(&self.fail_reads, "is_blacklisted").await?;
        self.inner.is_blacklisted(token).await
    }

    async fn add_to_blacklist(&self, token: &str, ttl_seconds: i64) -> Result<(), DomainError> {
        self.before_call(&self.fail_blacklist_add, "add_to_blacklist").await?;
        self.inner.add_to_blacklist(token, ttl_seconds).await
    }

    async fn try_add_to_blacklist(
        &self,
        token: &str,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError> {
        self.before_call(&self.fail_blacklist_add, "try_add_to_blacklist").await?;
        self.inner.try_add_to_blacklist(token, ttl_seconds).await
    }
}
