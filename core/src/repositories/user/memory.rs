//! In-memory user directory with bcrypt password hashes

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};

use super::r#trait::{UserDirectory, UserIdSequence};

/// User directory kept in process memory
///
/// Accounts are lost on restart but ids come from `ids`, so pointing it at
/// the credential store keeps ids unique for as long as issued tokens live.
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<User>>,
    ids: Arc<dyn UserIdSequence>,
    cost: u32,
}

impl InMemoryUserDirectory {
    /// Create a directory hashing with the default bcrypt cost
    pub fn new(ids: Arc<dyn UserIdSequence>) -> Self {
        Self::with_cost(ids, bcrypt::DEFAULT_COST)
    }

    /// Create a directory with a specific bcrypt cost
    pub fn with_cost(ids: Arc<dyn UserIdSequence>, cost: u32) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            ids,
            cost,
        }
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DomainError::Internal { message: e.to_string() })?
        .map_err(|e| DomainError::Internal { message: e.to_string() })
}

async fn verify_password(password: String, hash: String) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::Internal { message: e.to_string() })?
        .map_err(|e| DomainError::Internal { message: e.to_string() })
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        let password_hash = hash_password(password.to_string(), self.cost).await?;

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let id = self.ids.next_user_id().await?;
        let user = User::new(id, &email, name, password_hash);
        users.push(user.clone());
        tracing::info!(user_id = id, "Registered user");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<u64, DomainError> {
        let email = email.trim().to_lowercase();
        let found = {
            let users = self.users.read().await;
            users
                .iter()
                .find(|u| u.email == email)
                .map(|u| (u.id, u.password_hash.clone()))
        };

        let (id, hash) = found.ok_or(AuthError::InvalidCredentials)?;
        if verify_password(password.to_string(), hash).await? {
            Ok(id)
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::repositories::InMemoryCredentialStore;

    fn directory() -> InMemoryUserDirectory {
        InMemoryUserDirectory::with_cost(Arc::new(InMemoryCredentialStore::new()), 4)
    }

    #[tokio::test]
    async fn test_register_assigns_sequential_ids() {
        let dir = directory();
        let first = dir.register("a@example.com", "secret1", "A").await.unwrap();
        let second = dir.register("b@example.com", "secret2", "B").await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_ne!(first.password_hash, "secret1");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let dir = directory();
        dir.register("a@example.com", "secret1", "A").await.unwrap();
        let err = dir.register(" A@Example.com ", "other", "A2").await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let dir = directory();
        let user = dir.register("a@example.com", "secret1", "A").await.unwrap();

        assert_eq!(dir.authenticate("a@example.com", "secret1").await.unwrap(), user.id);
        assert!(matches!(
            dir.authenticate("a@example.com", "wrong").await.unwrap_err(),
            DomainError::Auth(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            dir.authenticate("nobody@example.com", "secret1").await.unwrap_err(),
            DomainError::Auth(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let dir = directory();
        let user = dir.register("a@example.com", "secret1", "A").await.unwrap();
        assert_eq!(dir.find_by_id(user.id).await.unwrap().unwrap().email, "a@example.com");
        assert!(dir.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fresh_directory_does_not_reuse_ids() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let before = InMemoryUserDirectory::with_cost(store.clone(), 4);
        let ada = before.register("ada@example.com", "secret1", "Ada").await.unwrap();

        // Restart: accounts are gone, the id sequence is not
        let after = InMemoryUserDirectory::with_cost(store, 4);
        let mallory = after.register("mallory@example.com", "secret2", "M").await.unwrap();

        assert_ne!(mallory.id, ada.id);
        assert!(after.find_by_id(ada.id).await.unwrap().is_none());
    }
}
