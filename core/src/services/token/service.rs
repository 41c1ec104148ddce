//! Session manager: issue, verify, rotate and revoke token pairs

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{Claims, TokenData, TokenKind, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::repositories::CredentialStore;

use super::clock::{Clock, SystemClock};
use super::codec::TokenCodec;
use super::config::SessionConfig;

/// Service for managing versioned JWT session pairs
///
/// A token is accepted when its signature checks out, it has not expired and
/// the version it carries is not older than the subject's stored version.
/// Refresh and logout additionally require that the refresh token is not
/// blacklisted. Bumping the stored version invalidates every token issued
/// before it, which is how logout and bulk revocation work.
pub struct SessionManager<S: CredentialStore> {
    store: S,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl<S: CredentialStore> SessionManager<S> {
    /// Creates a session manager reading the system clock
    ///
    /// # Errors
    ///
    /// Fails when the configured secret or algorithm cannot build a codec.
    pub fn new(store: S, config: SessionConfig) -> Result<Self, DomainError> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Creates a session manager with an explicit clock
    pub fn with_clock(
        store: S,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        if config.access_ttl_seconds <= 0 || config.refresh_ttl_seconds <= 0 {
            return Err(DomainError::Validation {
                message: "token lifetimes must be positive".to_string(),
            });
        }
        let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.algorithm)?;

        Ok(Self {
            store,
            codec,
            clock,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issues a pair for an already authenticated subject
    ///
    /// Both tokens carry the subject's current version, so earlier logins
    /// stay valid until something bumps it.
    pub async fn login(&self, user_id: u64) -> Result<TokenPair, TokenError> {
        let version = self
            .bounded("get_version", self.store.get_version(user_id))
            .await?;
        let pair = self.issue_pair(user_id, version)?;

        info!(user_id, version, "Issued token pair on login");
        Ok(pair)
    }

    /// Checks signature, version and expiry of a token of either kind
    ///
    /// The blacklist is not consulted here. Only refresh tokens are ever
    /// blacklisted and they are checked by [`refresh`](Self::refresh) and
    /// [`logout`](Self::logout).
    pub async fn verify_token(&self, token: &str) -> Result<TokenData, TokenError> {
        let claims = self.verify_claims(token, self.clock.now()).await?;
        Ok(TokenData::from(&claims))
    }

    /// Verifies a token and additionally requires it to be an access token
    pub async fn authenticate_access(&self, token: &str) -> Result<TokenData, TokenError> {
        let data = self.verify_token(token).await?;
        if data.token_type != TokenKind::Access {
            debug!(
                user_id = data.user_id,
                "Rejected {} token presented for access",
                data.token_type
            );
            return Err(TokenError::InvalidToken);
        }
        Ok(data)
    }

    /// Trades a refresh token for a new pair
    ///
    /// The presented token is blacklisted for the rest of its lifetime with
    /// an insert-if-absent, so of several concurrent refreshes with the same
    /// token exactly one wins and the others see `InBlackList`. The version
    /// bump then retires every other token of the subject, including the
    /// sibling access token and refresh tokens from other logins.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.reject_blacklisted(refresh_token).await?;

        // One reading for both the expiry check and the blacklist ttl, so a
        // token accepted as live always gets a positive ttl
        let now = self.clock.now();
        let claims = self.verify_claims(refresh_token, now).await?;
        Self::require_refresh(&claims)?;

        let ttl = claims.remaining_seconds(now);
        let claimed = self
            .bounded(
                "try_add_to_blacklist",
                self.store.try_add_to_blacklist(refresh_token, ttl),
            )
            .await?;
        if !claimed {
            warn!(
                user_id = claims.user_id,
                "Refresh token was already redeemed by a concurrent request"
            );
            return Err(TokenError::InBlackList);
        }

        let version = self
            .bounded("increment_version", self.store.increment_version(claims.user_id))
            .await?;
        let pair = self.issue_pair(claims.user_id, version)?;

        info!(user_id = claims.user_id, version, "Rotated token pair");
        Ok(pair)
    }

    /// Ends the session of the refresh token's subject
    ///
    /// The version bump is what revokes the session, on every device. The
    /// blacklist entry that follows only speeds up rejection of this exact
    /// token, so failing to write it is logged and not surfaced.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), TokenError> {
        self.reject_blacklisted(refresh_token).await?;

        let now = self.clock.now();
        let claims = self.verify_claims(refresh_token, now).await?;
        Self::require_refresh(&claims)?;

        let version = self
            .bounded("increment_version", self.store.increment_version(claims.user_id))
            .await?;

        let ttl = claims.remaining_seconds(now);
        if self
            .bounded("add_to_blacklist", self.store.add_to_blacklist(refresh_token, ttl))
            .await
            .is_err()
        {
            warn!(
                user_id = claims.user_id,
                "Logout blacklist write failed, token is still revoked by version"
            );
        }

        info!(user_id = claims.user_id, version, "Logged out");
        Ok(())
    }

    /// Invalidates every outstanding token of a subject
    ///
    /// Used after a password change or by an explicit sign-out-everywhere.
    /// Returns the new version.
    pub async fn revoke_all(&self, user_id: u64) -> Result<u64, TokenError> {
        let version = self
            .bounded("increment_version", self.store.increment_version(user_id))
            .await?;

        info!(user_id, version, "Revoked all sessions");
        Ok(version)
    }

    async fn verify_claims(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let claims = self.codec.decode(token)?;

        let current = self
            .bounded("get_version", self.store.get_version(claims.user_id))
            .await?;
        if claims.version < current {
            debug!(
                user_id = claims.user_id,
                token_version = claims.version,
                current_version = current,
                "Token version is stale"
            );
            return Err(TokenError::RefreshExpired);
        }

        if claims.is_expired_at(now) {
            return Err(TokenError::SessionExpired);
        }

        Ok(claims)
    }

    async fn reject_blacklisted(&self, token: &str) -> Result<(), TokenError> {
        let revoked = self
            .bounded("is_blacklisted", self.store.is_blacklisted(token))
            .await?;
        if revoked {
            return Err(TokenError::InBlackList);
        }
        Ok(())
    }

    fn require_refresh(claims: &Claims) -> Result<(), TokenError> {
        if claims.token_type != TokenKind::Refresh {
            debug!(
                user_id = claims.user_id,
                "Expected a refresh token, got {}",
                claims.token_type
            );
            return Err(TokenError::InvalidToken);
        }
        Ok(())
    }

    fn issue_pair(&self, user_id: u64, version: u64) -> Result<TokenPair, TokenError> {
        let now = self.clock.now();
        let access_token = self.codec.issue(
            user_id,
            TokenKind::Access,
            version,
            self.config.access_ttl_seconds,
            now,
        )?;
        let refresh_token = self.codec.issue(
            user_id,
            TokenKind::Refresh,
            version,
            self.config.refresh_ttl_seconds,
            now,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.config.access_ttl_seconds,
            refresh_expires_in: self.config.refresh_ttl_seconds,
        })
    }

    /// Runs a store call under the configured timeout
    ///
    /// Store errors and timeouts both become `InternalServer`.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, TokenError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, "Credential store call failed: {}", e);
                Err(TokenError::InternalServer)
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "Credential store call timed out"
                );
                Err(TokenError::InternalServer)
            }
        }
    }
}
