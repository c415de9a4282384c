//! In-memory user and lead repositories plus a cheap password hasher.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    LeadRepository, LeadRepositoryError, PasswordHashError, PasswordHasher, UserRepository,
    UserRepositoryError,
};
use crate::domain::{LEAD_STATUS_NEW, Lead, NewLead, Role, User, UserId, Username};

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> Vec<User> {
        guard(&self.users).clone()
    }

    /// Store a prebuilt account, bypassing the duplicate check.
    pub fn insert(&self, user: User) {
        guard(&self.users).push(user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserRepositoryError> {
        Ok(guard(&self.users)
            .iter()
            .find(|user| user.username == *username)
            .cloned())
    }

    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<User, UserRepositoryError> {
        let mut users = guard(&self.users);
        if users.iter().any(|user| user.username == *username) {
            return Err(UserRepositoryError::duplicate(username.as_str()));
        }
        let user = User {
            id: UserId::random(),
            username: username.clone(),
            password_hash: password_hash.to_owned(),
            role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn reset_credentials(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<bool, UserRepositoryError> {
        let mut users = guard(&self.users);
        let Some(user) = users.iter_mut().find(|user| user.username == *username) else {
            return Ok(false);
        };
        password_hash.clone_into(&mut user.password_hash);
        user.role = role;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: Mutex<Vec<Lead>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn create(&self, lead: &NewLead) -> Result<Lead, LeadRepositoryError> {
        let stored = Lead {
            id: Uuid::new_v4(),
            car_model: lead.car_model().to_owned(),
            customer_name: lead.customer_name().to_owned(),
            customer_phone: lead.customer_phone().to_owned(),
            inquiry_type: lead.inquiry_type().to_owned(),
            status: LEAD_STATUS_NEW.to_owned(),
            created_at: Utc::now(),
        };
        guard(&self.leads).insert(0, stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Lead>, LeadRepositoryError> {
        Ok(guard(&self.leads).clone())
    }
}

/// Reversible "hash" for tests where bcrypt cost would dominate run time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPasswordHasher;

const PLAIN_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("{PLAIN_PREFIX}{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        hash.strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::hash("unrecognised hash format"))
    }
}
