//! Reservation core: the row-locked booking transaction.
//!
//! At most one caller can reserve a given car. The authoritative status
//! check happens under the row lock taken by
//! [`ReservationTransaction::lock_car_status`]; any unlocked read made before
//! calling [`ReservationService::book_car`] is advisory only.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::ports::{CarStoreError, ReservationStore, ReservationTransaction};
use super::{CarId, CarStatus, Error, UserId};

/// Default bound applied to each store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure modes of [`ReservationService::book_car`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationError {
    /// No car has the requested id.
    #[error("car not found")]
    NotFound,
    /// The car exists but is already reserved or sold.
    #[error("car is not available for booking")]
    NotAvailable { status: CarStatus },
    /// Connection loss, timeout or statement failure. Never retried here.
    #[error("reservation store failure: {0}")]
    StoreFailure(CarStoreError),
}

impl ReservationError {
    /// Whether the failure came from the store rather than the car's state.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreFailure(_))
    }
}

impl From<ReservationError> for Error {
    fn from(value: ReservationError) -> Self {
        match value {
            ReservationError::NotFound => Error::not_found("car not found"),
            ReservationError::NotAvailable { .. } => {
                Error::conflict("car is not available for booking")
            }
            ReservationError::StoreFailure(err) if err.is_transient() => {
                Error::service_unavailable("reservation store is temporarily unavailable")
            }
            ReservationError::StoreFailure(err) => {
                Error::internal(format!("reservation failed: {err}"))
            }
        }
    }
}

/// Books cars through a [`ReservationStore`].
///
/// # Examples
/// ```rust,ignore
/// let service = ReservationService::new(store, Duration::from_secs(5));
/// service.book_car(car_id, user_id).await?;
/// ```
#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    call_timeout: Duration,
}

impl ReservationService {
    /// Bound every store call by `call_timeout`. An expired bound is a
    /// transient [`CarStoreError::Timeout`].
    pub fn new(store: Arc<dyn ReservationStore>, call_timeout: Duration) -> Self {
        Self {
            store,
            call_timeout,
        }
    }

    /// Reserve `car_id` for `user_id`.
    ///
    /// Succeeds only when the locked status is `available` or `transit`.
    /// The transaction is rolled back on every exit path; after a successful
    /// commit that rollback does nothing.
    pub async fn book_car(&self, car_id: CarId, user_id: UserId) -> Result<(), ReservationError> {
        let mut tx = self.bounded(self.store.begin()).await?;
        let outcome = self.reserve(tx.as_mut(), car_id, user_id).await;

        if let Err(err) = self.bounded(tx.rollback()).await {
            warn!(%car_id, error = %err, "reservation transaction release failed");
        }

        match &outcome {
            Ok(()) => info!(%car_id, %user_id, "car reserved"),
            Err(ReservationError::StoreFailure(err)) => {
                warn!(%car_id, %user_id, error = %err, "reservation aborted by store failure");
            }
            Err(err) => debug!(%car_id, %user_id, error = %err, "reservation refused"),
        }
        outcome
    }

    async fn reserve(
        &self,
        tx: &mut dyn ReservationTransaction,
        car_id: CarId,
        user_id: UserId,
    ) -> Result<(), ReservationError> {
        let status = self
            .bounded(tx.lock_car_status(car_id))
            .await?
            .ok_or(ReservationError::NotFound)?;
        if !status.is_reservable() {
            return Err(ReservationError::NotAvailable { status });
        }
        self.bounded(tx.mark_reserved(car_id, user_id)).await?;
        self.bounded(tx.commit()).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CarStoreError>>,
    ) -> Result<T, ReservationError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(ReservationError::StoreFailure),
            Err(_) => Err(ReservationError::StoreFailure(CarStoreError::timeout(
                format!("no response within {:?}", self.call_timeout),
            ))),
        }
    }
}
