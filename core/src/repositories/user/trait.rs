//! Identity lookup consumed by the login flow.
//!
//! Resolves credentials to the subject id the session manager issues tokens
//! for. The backing user store is owned by the user-management component.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait resolving e-mail and password to a subject
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user, failing with `AuthError::UserAlreadyExists` on a taken e-mail
    async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, DomainError>;

    /// Resolve credentials to a subject id
    ///
    /// Unknown e-mail and wrong password are indistinguishable:
    /// both fail with `AuthError::InvalidCredentials`.
    async fn authenticate(&self, email: &str, password: &str) -> Result<u64, DomainError>;

    /// Find a user by subject id
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, DomainError>;
}

/// Source of subject ids
///
/// An id is handed out once and never again, across restarts and across
/// instances when the sequence lives in a shared store. Tokens name their
/// subject by id, so a reused id would resolve an old token to a new account.
#[async_trait]
pub trait UserIdSequence: Send + Sync {
    /// Next unused id, starting at 1
    async fn next_user_id(&self) -> Result<u64, DomainError>;
}

#[async_trait]
impl<T: UserIdSequence + ?Sized> UserIdSequence for Arc<T> {
    async fn next_user_id(&self) -> Result<u64, DomainError> {
        (**self).next_user_id().await
    }
}
