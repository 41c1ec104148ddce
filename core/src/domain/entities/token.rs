//! Token entities for JWT-based sessions.
//!
//! Claims follow a fixed, typed schema. A token whose fields do not match it
//! (a string `user_id`, a float `version`, an unknown `token_type`) fails to
//! deserialize and is rejected as invalid rather than coerced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::TokenError;

/// The two credential kinds issued together as a session pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential granting API access
    Access,
    /// Long-lived credential used solely to mint new pairs
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            _ => Err(TokenError::UnknownTokenType),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub user_id: u64,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Subject's token version at issuance
    pub version: u64,

    /// Access or refresh
    pub token_type: TokenKind,

    /// Unique identifier so tokens minted in the same second differ
    pub jti: String,
}

impl Claims {
    /// Creates claims issued at `now` and valid for `ttl_seconds`
    pub fn new(
        user_id: u64,
        token_type: TokenKind,
        version: u64,
        now: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            user_id,
            iat: now,
            exp: now + ttl_seconds,
            version,
            token_type,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// A token whose expiry equals `now` is already expired
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Seconds of validity left at `now`, zero once expired
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.exp - now).max(0)
    }
}

/// Result of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub user_id: u64,
    pub exp: i64,
    pub version: u64,
    pub token_type: TokenKind,
}

impl From<&Claims> for TokenData {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            exp: claims.exp,
            version: claims.version,
            token_type: claims.token_type,
        }
    }
}

/// Access and refresh token issued together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}
