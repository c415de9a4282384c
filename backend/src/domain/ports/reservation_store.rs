//! Driven port for the row-locked reservation transaction.
//!
//! Adapters must hold an exclusive lock on the car row from
//! [`ReservationTransaction::lock_car_status`] until the transaction is
//! committed or rolled back. Plain reads are not blocked by that lock.

use async_trait::async_trait;

use crate::domain::{CarId, CarStatus, UserId};

use super::CarStoreError;

/// Opens reservation transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Start a transaction on a dedicated connection.
    async fn begin(&self) -> Result<Box<dyn ReservationTransaction>, CarStoreError>;
}

/// One open reservation transaction.
///
/// `rollback` must be safe to call on every exit path: after `commit` it
/// does nothing, and calling it twice does nothing the second time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationTransaction: Send {
    /// Read the car status and lock the row. `None` when the car is absent.
    async fn lock_car_status(&mut self, car_id: CarId) -> Result<Option<CarStatus>, CarStoreError>;

    /// Set `status = reserved` and record the owner.
    async fn mark_reserved(&mut self, car_id: CarId, user_id: UserId) -> Result<(), CarStoreError>;

    /// Make the reservation visible and release the lock.
    async fn commit(&mut self) -> Result<(), CarStoreError>;

    /// Discard uncommitted work and release the lock.
    async fn rollback(&mut self) -> Result<(), CarStoreError>;
}
