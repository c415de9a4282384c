//! bcrypt implementation of the password hashing port.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Work factor used for stored passwords.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest work factor bcrypt accepts.
const MIN_BCRYPT_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
const MAX_BCRYPT_COST: u32 = 31;

/// [`PasswordHasher`] storing bcrypt hashes.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl BcryptPasswordHasher {
    /// Hasher with a custom work factor, clamped to bcrypt's valid range.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        }
    }
}

async fn blocking<T, F>(work: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::hash(err.to_string()))?
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let cost = self.cost;
        blocking(move || bcrypt::hash(password.as_str(), cost)).await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        match blocking(move || bcrypt::verify(password.as_str(), &hash)).await {
            Ok(matches) => Ok(matches),
            Err(err) => {
                // A malformed stored hash can never match.
                debug!(error = %err, "stored hash rejected by bcrypt");
                Ok(false)
            }
        }
    }
}
