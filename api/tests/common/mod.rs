//! Shared fixtures for the API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;

use blog_api::routes::auth::AppState;
use blog_core::errors::DomainError;
use blog_core::repositories::{
    CredentialStore, InMemoryCredentialStore, InMemoryUserDirectory, UserIdSequence,
};
use blog_core::services::{SessionConfig, SessionManager};
use blog_shared::RefreshCookieConfig;

pub const TEST_SECRET: &str = "api-test-secret";

/// Sends a request and returns status, JSON body and response cookies
///
/// Middleware rejections surface as service errors rather than responses,
/// so both paths are rendered the way the server would render them.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        match actix_web::test::try_call_service(&$app, $req.to_request()).await {
            Ok(resp) => {
                let status = resp.status();
                let cookies: Vec<actix_web::cookie::Cookie<'static>> = resp
                    .response()
                    .cookies()
                    .map(|c| c.into_owned())
                    .collect();
                let body = actix_web::test::read_body(resp).await;
                (status, $crate::common::json(&body), cookies)
            }
            Err(err) => {
                let resp = err.error_response();
                let status = resp.status();
                let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
                (status, $crate::common::json(&body), Vec::new())
            }
        }
    }};
}

pub fn json(body: &[u8]) -> serde_json::Value {
    if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(body).unwrap_or(serde_json::Value::Null)
    }
}

pub fn users(ids: Arc<dyn UserIdSequence>) -> Arc<InMemoryUserDirectory> {
    Arc::new(InMemoryUserDirectory::with_cost(ids, 4))
}

pub fn state_with<S: CredentialStore + 'static>(
    store: S,
) -> web::Data<AppState<S, InMemoryUserDirectory>> {
    build_state(store, users(Arc::new(InMemoryCredentialStore::new())))
}

/// State whose sessions and user ids both live in `store`
///
/// Two states built on the same store behave like one server before and
/// after a restart: the store survives, the user directory does not.
pub fn state_on(
    store: Arc<InMemoryCredentialStore>,
) -> web::Data<AppState<Arc<InMemoryCredentialStore>, InMemoryUserDirectory>> {
    let users = users(store.clone());
    build_state(store, users)
}

fn build_state<S: CredentialStore + 'static>(
    store: S,
    users: Arc<InMemoryUserDirectory>,
) -> web::Data<AppState<S, InMemoryUserDirectory>> {
    let sessions = SessionManager::new(store, SessionConfig::new(TEST_SECRET)).unwrap();
    web::Data::new(AppState::new(Arc::new(sessions), users, RefreshCookieConfig::default()))
}

pub fn state() -> web::Data<AppState<InMemoryCredentialStore, InMemoryUserDirectory>> {
    state_with(InMemoryCredentialStore::new())
}

/// Store whose every call fails
pub struct UnavailableStore;

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn get_version(&self, _: u64) -> Result<u64, DomainError> {
        Err(unavailable())
    }

    async fn increment_version(&self, _: u64) -> Result<u64, DomainError> {
        Err(unavailable())
    }

    async fn is_blacklisted(&self, _: &str) -> Result<bool, DomainError> {
        Err(unavailable())
    }

    async fn add_to_blacklist(&self, _: &str, _: i64) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn try_add_to_blacklist(&self, _: &str, _: i64) -> Result<bool, DomainError> {
        Err(unavailable())
    }
}

fn unavailable() -> DomainError {
    DomainError::Store {
        message: "connection refused".to_string(),
    }
}
