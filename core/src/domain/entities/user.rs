//! User entity as seen by the identity lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Subject identifier embedded in tokens
    pub id: u64,

    /// Login e-mail, stored lowercase
    pub email: String,

    /// Display name
    pub name: String,

    /// Adaptive password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance
    pub fn new(id: u64, email: &str, name: impl Into<String>, password_hash: String) -> Self {
        Self {
            id,
            email: email.trim().to_lowercase(),
            name: name.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}
