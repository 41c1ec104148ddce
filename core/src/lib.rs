//! # Blog API Core
//!
//! Session and token lifecycle for the blog API: typed token claims, the
//! versioned credential store contract, the token codec and the session
//! manager that issues, verifies, rotates and revokes token pairs.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::{Claims, TokenData, TokenKind, TokenPair, User};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{
    CredentialStore, InMemoryCredentialStore, InMemoryUserDirectory, UserDirectory, UserIdSequence,
};
pub use services::{Clock, FixedClock, SessionConfig, SessionManager, SystemClock, TokenCodec};
