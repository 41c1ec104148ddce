//! Signing and decoding of session tokens

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;
use tracing::{debug, error};

use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::{DomainError, TokenError};

/// Algorithms accepted on decode. Anything outside the HMAC family,
/// `none` included, is rejected before the signature is looked at.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// HMAC token codec bound to a single shared secret
///
/// Expiry is not checked here. The session manager compares `exp` against
/// its own clock so that the boundary is exact and testable.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec signing with `algorithm`
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty secret or a non-HMAC algorithm.
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, DomainError> {
        if !HMAC_ALGORITHMS.contains(&algorithm) {
            return Err(DomainError::Validation {
                message: format!("signing algorithm {:?} is not an HMAC algorithm", algorithm),
            });
        }
        if secret.is_empty() {
            return Err(DomainError::Validation {
                message: "signing secret must not be empty".to_string(),
            });
        }

        let mut validation = Validation::new(algorithm);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs a fresh token for the subject
    pub fn issue(
        &self,
        user_id: u64,
        kind: TokenKind,
        version: u64,
        ttl_seconds: i64,
        now: i64,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, kind, version, now, ttl_seconds);
        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign {} token: {}", claims.token_type, e);
            TokenError::InternalServer
        })
    }

    /// Checks the signature and parses the claims
    ///
    /// Every failure collapses to [`TokenError::InvalidToken`]: bad encoding,
    /// bad signature, disallowed algorithm, missing or mistyped fields.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected by codec: {:?}", e.kind());
                TokenError::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
