//! Port and runtime bundles for the pricing worker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{ExchangeRateSource, RepricingRepository};

/// Suspends the worker between cycles.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Return after `duration`. Tests substitute an implementation that
    /// records the period instead of waiting.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Driven ports used by one cycle.
#[derive(Clone)]
pub struct PricingWorkerPorts {
    /// Supplies the rate once per cycle.
    pub rate_source: Arc<dyn ExchangeRateSource>,
    /// Reads eligible cars and writes new prices.
    pub repository: Arc<dyn RepricingRepository>,
}

impl PricingWorkerPorts {
    /// Bundle the worker's driven ports.
    pub fn new(
        rate_source: Arc<dyn ExchangeRateSource>,
        repository: Arc<dyn RepricingRepository>,
    ) -> Self {
        Self {
            rate_source,
            repository,
        }
    }
}

/// Time sources for the worker loop and cycle reports.
#[derive(Clone)]
pub struct PricingWorkerRuntime {
    /// Waits out the period between cycles.
    pub sleeper: Arc<dyn Sleeper>,
    /// Timestamps cycle reports.
    pub clock: Arc<dyn Clock>,
}

impl Default for PricingWorkerRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(DefaultClock),
        }
    }
}
