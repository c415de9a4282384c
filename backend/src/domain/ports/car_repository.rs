//! Driven port for car inventory persistence.

use async_trait::async_trait;

use crate::domain::{Car, CarId, CarStatus, NewCar};

use super::define_port_error;

define_port_error! {
    /// Errors raised by every adapter touching the `cars` table.
    pub enum CarStoreError {
        /// No connection could be obtained or it dropped mid-call.
        Connection => "car store connection failed",
        /// The statement failed for a non-transient reason.
        Query => "car store query failed",
        /// The call did not finish within the configured bound.
        Timeout => "car store call timed out",
        /// A unique constraint (the VIN) rejected the write.
        Duplicate => "car already exists",
    }
}

impl CarStoreError {
    /// Connection loss and timeouts may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Inventory reads and staff-driven writes.
///
/// Reservation and repricing writes go through
/// [`ReservationStore`](super::ReservationStore) and
/// [`RepricingRepository`](super::RepricingRepository).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Cars shown to customers (`available` and `transit`), newest first.
    async fn list_catalog(&self) -> Result<Vec<Car>, CarStoreError>;

    /// Every car regardless of status, newest first.
    async fn list_all(&self) -> Result<Vec<Car>, CarStoreError>;

    /// Plain unlocked read of one car.
    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, CarStoreError>;

    /// Insert a car in `transit` with a zero local price.
    async fn create(&self, car: &NewCar) -> Result<Car, CarStoreError>;

    /// Set a staff-assignable status and clear any reservation owner.
    /// Returns `false` when the car does not exist.
    async fn update_status(&self, id: CarId, status: CarStatus) -> Result<bool, CarStoreError>;

    /// Delete a car. Returns `false` when the car does not exist.
    async fn delete(&self, id: CarId) -> Result<bool, CarStoreError>;
}
