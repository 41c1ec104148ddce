//! Process-local credential store for development and testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::errors::DomainError;

use super::keys::{blacklist_key, version_key};
use super::r#trait::CredentialStore;
use crate::repositories::user::UserIdSequence;

/// In-memory credential store
///
/// Revoked entries carry their own deadline and are purged lazily. Each
/// map sits behind a single mutex, which makes increment and
/// insert-if-absent atomic within the process. Not shared across instances.
/// Also serves as the subject id sequence for the in-memory directory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    versions: Mutex<HashMap<String, u64>>,
    blacklist: Mutex<HashMap<String, Instant>>,
    user_ids: AtomicU64,
}

impl InMemoryCredentialStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of revoked tokens that have not expired yet
    pub async fn revoked_count(&self) -> usize {
        let mut blacklist = self.blacklist.lock().await;
        purge_expired(&mut blacklist);
        blacklist.len()
    }
}

fn purge_expired(blacklist: &mut HashMap<String, Instant>) {
    let now = Instant::now();
    blacklist.retain(|_, deadline| *deadline > now);
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_version(&self, user_id: u64) -> Result<u64, DomainError> {
        let versions = self.versions.lock().await;
        Ok(versions.get(&version_key(user_id)).copied().unwrap_or(0))
    }

    async fn increment_version(&self, user_id: u64) -> Result<u64, DomainError> {
        let mut versions = self.versions.lock().await;
        let version = versions.entry(version_key(user_id)).or_insert(0);
        *version += 1;
        Ok(*version)
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, DomainError> {
        let blacklist = self.blacklist.lock().await;
        Ok(blacklist
            .get(&blacklist_key(token))
            .is_some_and(|deadline| *deadline > Instant::now()))
    }

    async fn add_to_blacklist(&self, token: &str, ttl_seconds: i64) -> Result<(), DomainError> {
        if ttl_seconds <= 0 {
            return Ok(());
        }
        let mut blacklist = self.blacklist.lock().await;
        purge_expired(&mut blacklist);
        blacklist.insert(
            blacklist_key(token),
            Instant::now() + Duration::from_secs(ttl_seconds as u64),
        );
        Ok(())
    }

    async fn try_add_to_blacklist(
        &self,
        token: &str,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError> {
        if ttl_seconds <= 0 {
            return Ok(true);
        }
        let mut blacklist = self.blacklist.lock().await;
        purge_expired(&mut blacklist);
        let key = blacklist_key(token);
        if blacklist.contains_key(&key) {
            return Ok(false);
        }
        blacklist.insert(key, Instant::now() + Duration::from_secs(ttl_seconds as u64));
        Ok(true)
    }
}

#[async_trait]
impl UserIdSequence for InMemoryCredentialStore {
    async fn next_user_id(&self) -> Result<u64, DomainError> {
        Ok(self.user_ids.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_version_is_zero() {
        let store = InMemoryCredentialStore::new();
        assert_eq!(store.get_version(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_creates_and_advances() {
        let store = InMemoryCredentialStore::new();
        assert_eq!(store.increment_version(7).await.unwrap(), 1);
        assert_eq!(store.increment_version(7).await.unwrap(), 2);
        assert_eq!(store.get_version(7).await.unwrap(), 2);
        assert_eq!(store.get_version(8).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_version(1).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.get_version(1).await.unwrap(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blacklist_entry_expires_with_ttl() {
        let store = InMemoryCredentialStore::new();
        store.add_to_blacklist("token", 30).await.unwrap();
        assert!(store.is_blacklisted("token").await.unwrap());

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(store.is_blacklisted("token").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.is_blacklisted("token").await.unwrap());
        assert_eq!(store.revoked_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_positive_ttl_is_a_no_op() {
        let store = InMemoryCredentialStore::new();
        store.add_to_blacklist("expired", 0).await.unwrap();
        store.add_to_blacklist("expired", -5).await.unwrap();
        assert!(!store.is_blacklisted("expired").await.unwrap());
        assert!(store.try_add_to_blacklist("expired", 0).await.unwrap());
        assert_eq!(store.revoked_count().await, 0);
    }

    #[tokio::test]
    async fn test_try_add_only_first_caller_wins() {
        let store = InMemoryCredentialStore::new();
        assert!(store.try_add_to_blacklist("token", 60).await.unwrap());
        assert!(!store.try_add_to_blacklist("token", 60).await.unwrap());
        assert!(store.is_blacklisted("token").await.unwrap());
    }

    #[tokio::test]
    async fn test_user_id_sequence_starts_at_one() {
        let store = InMemoryCredentialStore::new();
        assert_eq!(store.next_user_id().await.unwrap(), 1);
        assert_eq!(store.next_user_id().await.unwrap(), 2);
        // Independent of the version counters
        assert_eq!(store.get_version(1).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_add_succeeds_again_after_expiry() {
        let store = InMemoryCredentialStore::new();
        assert!(store.try_add_to_blacklist("token", 5).await.unwrap());
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(store.try_add_to_blacklist("token", 5).await.unwrap());
    }
}
