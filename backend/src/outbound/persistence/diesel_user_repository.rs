//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Role, User, Username};

use super::error_mapping::{DieselErrorKinds, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserCredentialsUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USER_ERROR_KINDS: DieselErrorKinds<UserRepositoryError> = DieselErrorKinds {
    query: UserRepositoryError::query,
    connection: UserRepositoryError::connection,
    duplicate: Some(UserRepositoryError::duplicate),
};

fn map_user_pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn map_user_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(error, &USER_ERROR_KINDS)
}

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Build the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_user_diesel_error)?;
        row.map(|row| User::try_from(row).map_err(UserRepositoryError::query))
            .transpose()
    }

    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: username.as_str(),
            password_hash,
            role: role.as_str(),
        };
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        User::try_from(stored).map_err(UserRepositoryError::query)
    }

    async fn reset_credentials(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        let changes = UserCredentialsUpdate {
            password_hash,
            role: role.as_str(),
        };
        let updated = diesel::update(users::table.filter(users::username.eq(username.as_str())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(updated > 0)
    }
}
