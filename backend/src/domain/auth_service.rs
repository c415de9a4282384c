//! Registration, login and administrator credential resets.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{PasswordHasher, UserRepository};
use super::{Error, LoginCredentials, Registration, Role, User, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Result of [`AuthService::reset_credentials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialReset {
    Created,
    Updated,
}

/// Registration, login and credential resets.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Build the service over the user store and password hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Create a `user` account.
    pub async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let hash = self.hasher.hash(registration.password()).await?;
        let user = self
            .users
            .create(registration.username(), &hash, Role::User)
            .await?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials. Unknown users and wrong passwords fail alike.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(user) = self.users.find_by_username(credentials.username()).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        match self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await
        {
            Ok(true) => Ok(user),
            Ok(false) => Err(Error::unauthorized(INVALID_CREDENTIALS)),
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "stored password hash unreadable");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }

    /// Create the account or overwrite its password and role, then read it
    /// back and confirm the password verifies.
    pub async fn reset_credentials(
        &self,
        username: &Username,
        password: &str,
        role: Role,
    ) -> Result<CredentialReset, Error> {
        let hash = self.hasher.hash(password).await?;
        let outcome = if self.users.reset_credentials(username, &hash, role).await? {
            CredentialReset::Updated
        } else {
            self.users.create(username, &hash, role).await?;
            CredentialReset::Created
        };

        let stored = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::internal("account missing after reset"))?;
        if !self.hasher.verify(password, &stored.password_hash).await? {
            return Err(Error::internal("stored hash does not verify"));
        }
        info!(%username, %role, ?outcome, "credentials reset");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::{InMemoryUserRepository, PlainPasswordHasher};
    use rstest::{fixture, rstest};

    #[fixture]
    fn users() -> Arc<InMemoryUserRepository> {
        Arc::new(InMemoryUserRepository::new())
    }

    fn service(users: &Arc<InMemoryUserRepository>) -> AuthService {
        AuthService::new(users.clone(), Arc::new(PlainPasswordHasher))
    }

    fn registration(name: &str) -> Registration {
        Registration::try_from_parts(name, "secret1").expect("valid registration")
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_and_assigns_user_role(users: Arc<InMemoryUserRepository>) {
        let user = service(&users)
            .register(&registration("alice"))
            .await
            .expect("registered");
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "secret1");
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_username_conflicts(users: Arc<InMemoryUserRepository>) {
        let service = service(&users);
        service.register(&registration("bob")).await.expect("first");
        let err = service
            .register(&registration("bob"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case("alice", "secret1", true)]
    #[case("alice", "wrong!!", false)]
    #[case("nobody", "secret1", false)]
    #[tokio::test]
    async fn login_checks_password(
        users: Arc<InMemoryUserRepository>,
        #[case] username: &str,
        #[case] password: &str,
        #[case] ok: bool,
    ) {
        let service = service(&users);
        service.register(&registration("alice")).await.expect("registered");
        let creds = LoginCredentials::try_from_parts(username, password).expect("shape");

        match service.login(&creds).await {
            Ok(user) => {
                assert!(ok);
                assert_eq!(user.username.as_str(), "alice");
            }
            Err(err) => {
                assert!(!ok);
                assert_eq!(err.code(), ErrorCode::Unauthorized);
                assert_eq!(err.message(), INVALID_CREDENTIALS);
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn reset_creates_then_updates_admin(users: Arc<InMemoryUserRepository>) {
        let service = service(&users);
        let admin = Username::new("admin").expect("username");

        let first = service
            .reset_credentials(&admin, "first-pass", Role::Admin)
            .await
            .expect("created");
        let second = service
            .reset_credentials(&admin, "second-pass", Role::Admin)
            .await
            .expect("updated");

        assert_eq!((first, second), (CredentialReset::Created, CredentialReset::Updated));
        let creds = LoginCredentials::try_from_parts("admin", "second-pass").expect("shape");
        let user = service.login(&creds).await.expect("new password works");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(users.users().len(), 1);
    }
}
