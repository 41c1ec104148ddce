//! Error types for the session lifecycle and identity lookup

use thiserror::Error;

/// Authentication (identity lookup) errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,
}

/// Session manager verdicts
///
/// Input-shape (`InvalidToken`) and policy errors (`SessionExpired`,
/// `RefreshExpired`, `InBlackList`) are resolved by the caller
/// re-authenticating. `InternalServer` means the credential store failed or
/// timed out and the operation may be retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Session expired")]
    SessionExpired,

    #[error("Token expired due to logout, rotation or password change")]
    RefreshExpired,

    #[error("Refresh token revoked or not found")]
    InBlackList,

    #[error("Internal server error")]
    InternalServer,

    #[error("Unknown token type")]
    UnknownTokenType,
}

impl TokenError {
    /// True when the caller has to log in again, false for infrastructure failures
    pub fn requires_reauthentication(&self) -> bool {
        !matches!(self, TokenError::InternalServer)
    }
}
