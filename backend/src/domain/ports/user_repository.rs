//! Driven port for user account persistence.
use async_trait::async_trait;

use crate::domain::{Role, User, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        Connection => "user repository connection failed",
        Query => "user repository query failed",
        Timeout => "user repository call timed out",
        /// The username is already taken.
        Duplicate => "username already exists",
    }
}

/// Stores accounts and their password hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up an account; `None` when the name is unknown.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserRepositoryError>;

    /// Insert a new account.
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<User, UserRepositoryError>;

    /// Replace the password hash and role of an existing account. Returns
    /// `false` when no such user exists.
    async fn reset_credentials(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<bool, UserRepositoryError>;
}
