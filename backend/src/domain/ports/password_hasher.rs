//! Driven port for one-way password hashing.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures of the password hashing adapter.
    pub enum PasswordHashError {
        /// Hashing or parsing a stored hash failed.
        Hash => "password hashing failed",
    }
}

/// Hashes and verifies passwords. Implementations may be CPU heavy and
/// should keep that work off the async executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash suitable for storage.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// `Ok(false)` for a well-formed hash that does not match.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
