//! Business services

pub mod token;

pub use token::{Clock, FixedClock, SessionConfig, SessionManager, SystemClock, TokenCodec};
