//! PostgreSQL reservation transactions.
//!
//! Each transaction owns one pooled connection for its whole lifetime and
//! drives `BEGIN`/`COMMIT`/`ROLLBACK` through diesel-async's transaction
//! manager, so the port can expose the steps individually. The row lock is
//! taken with `SELECT status ... FOR UPDATE`. Every transaction sets
//! `lock_timeout` so PostgreSQL abandons a lock wait on its own instead of
//! leaving the statement queued after the caller has given up.
//!
//! A transaction dropped while still open (for example when the request
//! future is cancelled) hands its connection back with an open transaction.
//! The pool treats such a connection as broken and closes it, and PostgreSQL
//! aborts the transaction, releasing the lock.

use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::domain::ports::{CarStoreError, ReservationStore, ReservationTransaction};
use crate::domain::reservation::DEFAULT_STORE_TIMEOUT;
use crate::domain::{CarId, CarStatus, UserId};

use super::diesel_car_repository::{map_car_diesel_error, map_car_pool_error};
use super::pool::DbPool;
use super::schema::cars;

type Manager = AnsiTransactionManager;

/// Diesel-backed [`ReservationStore`].
#[derive(Clone)]
pub struct DieselReservationStore {
    pool: DbPool,
    lock_timeout: Duration,
}

impl DieselReservationStore {
    /// Store whose row-lock waits give up after [`DEFAULT_STORE_TIMEOUT`].
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override how long `lock_car_status` may wait for a contended row.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

/// `SET LOCAL` takes no bind parameters; the value is always an integer.
/// Zero would disable the timeout, so it is raised to one millisecond.
fn lock_timeout_statement(lock_timeout: Duration) -> String {
    format!("SET LOCAL lock_timeout = '{}ms'", lock_timeout.as_millis().max(1))
}

/// PostgreSQL reports an expired `lock_timeout` as SQLSTATE 55P03, which
/// Diesel surfaces without a dedicated kind.
fn is_lock_timeout(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info)
            if info.message().contains("lock timeout")
    )
}

#[async_trait]
impl ReservationStore for DieselReservationStore {
    async fn begin(&self) -> Result<Box<dyn ReservationTransaction>, CarStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_car_pool_error)?;
        <Manager as TransactionManager<AsyncPgConnection>>::begin_transaction(&mut *conn)
            .await
            .map_err(map_car_diesel_error)?;
        let mut tx = DieselReservationTransaction { conn, open: true };
        let configured = diesel::sql_query(lock_timeout_statement(self.lock_timeout))
            .execute(&mut *tx.conn)
            .await;
        if let Err(err) = configured {
            let mapped = map_car_diesel_error(err);
            if let Err(rollback) = tx.rollback().await {
                // The pool discards the connection.
                debug!(error = %rollback, "rollback after failed lock_timeout setup");
            }
            return Err(mapped);
        }
        Ok(Box::new(tx))
    }
}

struct DieselReservationTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
    open: bool,
}

#[async_trait]
impl ReservationTransaction for DieselReservationTransaction {
    async fn lock_car_status(&mut self, car_id: CarId) -> Result<Option<CarStatus>, CarStoreError> {
        let status: Option<String> = cars::table
            .find(*car_id.as_uuid())
            .select(cars::status)
            .for_update()
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(|err| {
                if is_lock_timeout(&err) {
                    CarStoreError::timeout(format!("car {car_id} stayed locked"))
                } else {
                    map_car_diesel_error(err)
                }
            })?;
        status
            .map(|raw| raw.parse::<CarStatus>())
            .transpose()
            .map_err(|err| CarStoreError::query(format!("car {car_id}: {err}")))
    }

    async fn mark_reserved(&mut self, car_id: CarId, user_id: UserId) -> Result<(), CarStoreError> {
        let updated = diesel::update(cars::table.find(*car_id.as_uuid()))
            .set((
                cars::status.eq(CarStatus::Reserved.as_str()),
                cars::reserved_by.eq(*user_id.as_uuid()),
            ))
            .execute(&mut *self.conn)
            .await
            .map_err(map_car_diesel_error)?;
        if updated == 0 {
            return Err(CarStoreError::query(format!("car {car_id} vanished while locked")));
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), CarStoreError> {
        // A failed COMMIT is rolled back by the transaction manager itself.
        self.open = false;
        <Manager as TransactionManager<AsyncPgConnection>>::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_car_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), CarStoreError> {
        if !std::mem::replace(&mut self.open, false) {
            return Ok(());
        }
        <Manager as TransactionManager<AsyncPgConnection>>::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_car_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    struct Info(&'static str);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[rstest]
    #[case(Duration::from_millis(250), "SET LOCAL lock_timeout = '250ms'")]
    #[case(Duration::from_secs(5), "SET LOCAL lock_timeout = '5000ms'")]
    #[case(Duration::ZERO, "SET LOCAL lock_timeout = '1ms'")]
    fn lock_timeout_is_rendered_in_milliseconds(#[case] timeout: Duration, #[case] sql: &str) {
        assert_eq!(lock_timeout_statement(timeout), sql);
    }

    #[rstest]
    #[case("canceling statement due to lock timeout", true)]
    #[case("canceling statement due to statement timeout", false)]
    fn only_lock_timeouts_are_recognised(#[case] message: &'static str, #[case] expected: bool) {
        let err = DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new(Info(message)));
        assert_eq!(is_lock_timeout(&err), expected);
    }

    #[rstest]
    fn unique_violation_is_not_a_lock_timeout() {
        let err = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info("lock timeout")),
        );
        assert!(!is_lock_timeout(&err));
    }
}
