//! Integration tests for the Redis client and credential store
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p blog_infra --test redis_integration -- --ignored

use std::sync::Arc;

use blog_core::repositories::{CredentialStore, UserIdSequence};
use blog_core::{SessionConfig, SessionManager, TokenError};
use blog_infra::cache::{CacheConfig, RedisClient, RedisCredentialStore};
use uuid::Uuid;

fn test_config() -> CacheConfig {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    CacheConfig::new(url)
        .with_prefix(format!("blog-test-{}", Uuid::new_v4()))
}

fn unique_user() -> u64 {
    (Uuid::new_v4().as_u128() >> 80) as u64
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_connection() {
    let client = RedisClient::new(test_config()).await.unwrap();
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_set_if_absent_only_once() {
    let client = RedisClient::new(test_config()).await.unwrap();
    let key = client.config().make_key("conditional");

    assert!(client.set_if_absent_with_expiry(&key, "first", 60).await.unwrap());
    assert!(!client.set_if_absent_with_expiry(&key, "second", 60).await.unwrap());
    assert_eq!(client.get(&key).await.unwrap(), Some("first".to_string()));

    let ttl = client.ttl(&key).await.unwrap().unwrap();
    assert!(ttl > 0 && ttl <= 60);

    client.delete(&key).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_version_counter() {
    let store = RedisCredentialStore::connect(test_config()).await.unwrap();
    let user = unique_user();

    assert_eq!(store.get_version(user).await.unwrap(), 0);
    assert_eq!(store.increment_version(user).await.unwrap(), 1);
    assert_eq!(store.increment_version(user).await.unwrap(), 2);
    assert_eq!(store.get_version(user).await.unwrap(), 2);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_user_ids_survive_reconnect() {
    let config = test_config();
    let first = RedisCredentialStore::connect(config.clone()).await.unwrap();
    assert_eq!(first.next_user_id().await.unwrap(), 1);
    assert_eq!(first.next_user_id().await.unwrap(), 2);

    let reconnected = RedisCredentialStore::connect(config).await.unwrap();
    assert_eq!(reconnected.next_user_id().await.unwrap(), 3);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_corrupt_version_is_an_error() {
    let store = RedisCredentialStore::connect(test_config()).await.unwrap();
    let user = unique_user();
    let key = store.client().config().make_key(&format!("user_version:{}", user));

    store.client().set_with_expiry(&key, "not-a-number", 60).await.unwrap();
    assert!(store.get_version(user).await.is_err());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_blacklist_expiry() {
    let store = RedisCredentialStore::connect(test_config()).await.unwrap();
    let token = format!("token-{}", Uuid::new_v4());

    store.add_to_blacklist(&token, 1).await.unwrap();
    assert!(store.is_blacklisted(&token).await.unwrap());

    tokio::time::sleep(tokio::time::Duration::from_millis(2100)).await;
    assert!(!store.is_blacklisted(&token).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_concurrent_refresh_against_redis() {
    let store = RedisCredentialStore::connect(test_config()).await.unwrap();
    let manager =
        Arc::new(SessionManager::new(store, SessionConfig::new("redis-test-secret")).unwrap());
    let user = unique_user();
    let pair = manager.login(user).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = manager.clone();
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move { manager.refresh(&token).await }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert!(matches!(e, TokenError::InBlackList | TokenError::RefreshExpired)),
        }
    }
    assert_eq!(winners, 1);
}
