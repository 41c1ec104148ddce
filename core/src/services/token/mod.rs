//! Session and token lifecycle
//!
//! This module handles all token-related operations including:
//! - Issuing access/refresh pairs stamped with the subject's version
//! - Verifying signature, expiry and version of a presented token
//! - Rotating refresh tokens exactly once
//! - Logout and bulk revocation through version bumps

mod clock;
mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::TokenCodec;
pub use config::SessionConfig;
pub use service::SessionManager;
