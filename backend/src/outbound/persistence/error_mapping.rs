//! Shared Diesel and pool error mapping for the repository adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Constructors a repository error type offers for Diesel failures.
pub(crate) struct DieselErrorKinds<E> {
    pub query: fn(&'static str) -> E,
    pub connection: fn(&'static str) -> E,
    /// Falls back to `query` when the port has no duplicate variant.
    pub duplicate: Option<fn(&'static str) -> E>,
}

/// Map common Diesel error variants onto the given constructors.
pub(crate) fn map_diesel_error<E>(error: DieselError, kinds: &DieselErrorKinds<E>) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => (kinds.query)("record not found"),
        DieselError::QueryBuilderError(_) => (kinds.query)("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (kinds.connection)("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            kinds.duplicate.unwrap_or(kinds.query)("unique constraint violated")
        }
        DieselError::BrokenTransactionManager => (kinds.connection)("transaction state lost"),
        _ => (kinds.query)("database error"),
    }
}
