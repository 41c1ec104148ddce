//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{Claims, TokenData, TokenKind, TokenPair};
pub use user::User;
