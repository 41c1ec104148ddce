//! Key layout shared by every credential store backend.

/// Prefix of the per-subject version counter
pub const VERSION_KEY_PREFIX: &str = "user_version:";

/// Prefix of a revoked refresh token entry
pub const BLACKLIST_KEY_PREFIX: &str = "jwt_refresh:";

/// Counter handing out subject ids
pub const USER_ID_SEQUENCE_KEY: &str = "user_id_seq";

/// Value stored under a revoked token key
pub const REVOKED_SENTINEL: &str = "revoked";

/// `user_version:<subject>`
pub fn version_key(user_id: u64) -> String {
    format!("{}{}", VERSION_KEY_PREFIX, user_id)
}

/// `jwt_refresh:<token>`
pub fn blacklist_key(token: &str) -> String {
    format!("{}{}", BLACKLIST_KEY_PREFIX, token)
}
