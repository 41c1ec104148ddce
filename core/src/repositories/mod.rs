pub mod credential;
pub mod user;

pub use credential::{CredentialStore, InMemoryCredentialStore};
pub use user::{InMemoryUserDirectory, UserDirectory, UserIdSequence};
