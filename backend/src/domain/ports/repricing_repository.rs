//! Driven port used by the pricing worker.

use async_trait::async_trait;

use crate::domain::CarId;

use super::CarStoreError;

/// Minimal view of a car needed to recompute its local price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepricingCandidate {
    pub id: CarId,
    pub price_usd: f64,
    pub price_kzt: f64,
}

/// Reads repriceable cars and writes their local price.
///
/// `set_price` is a single unconditional write that does not take the
/// reservation row lock. A reservation committed between
/// [`eligible_cars`](Self::eligible_cars) and `set_price` still receives the
/// new price; the local price of a reserved car is informational only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepricingRepository: Send + Sync {
    /// Cars in `available` or `transit`.
    async fn eligible_cars(&self) -> Result<Vec<RepricingCandidate>, CarStoreError>;

    /// Overwrite the local price of one car.
    async fn set_price(&self, id: CarId, price_kzt: f64) -> Result<(), CarStoreError>;
}
