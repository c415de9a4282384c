//! Simulated national-bank rate feed.
//!
//! Draws a uniform rate from a configured range after an artificial delay.
//! The RNG belongs to the adapter instance, so two sources built with the
//! same seed produce the same sequence.

use std::ops::RangeInclusive;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::ports::{ExchangeRate, ExchangeRateSource, RateSourceError};

/// Settings for [`SimulatedRateSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRateConfig {
    pub min: f64,
    pub max: f64,
    /// Delay before each answer.
    pub latency: Duration,
    /// Fixed seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for SimulatedRateConfig {
    fn default() -> Self {
        Self {
            min: 520.0,
            max: 530.0,
            latency: Duration::from_millis(500),
            seed: None,
        }
    }
}

/// Random exchange-rate source used when no upstream URL is configured.
pub struct SimulatedRateSource {
    range: RangeInclusive<f64>,
    latency: Duration,
    rng: Mutex<SmallRng>,
}

impl SimulatedRateSource {
    /// Build a source drawing from `[config.min, config.max]`.
    ///
    /// # Errors
    ///
    /// Returns `RateSourceError::InvalidRate` when the bounds are not
    /// positive, finite and ordered.
    pub fn new(config: SimulatedRateConfig) -> Result<Self, RateSourceError> {
        let min = ExchangeRate::new(config.min)?.value();
        let max = ExchangeRate::new(config.max)?.value();
        if min > max {
            return Err(RateSourceError::invalid_rate(format!(
                "range minimum {min} exceeds maximum {max}"
            )));
        }
        let rng = config
            .seed
            .map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64);
        Ok(Self {
            range: min..=max,
            latency: config.latency,
            rng: Mutex::new(rng),
        })
    }

    fn draw(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(self.range.clone())
    }
}

#[async_trait]
impl ExchangeRateSource for SimulatedRateSource {
    async fn current_rate(&self) -> Result<ExchangeRate, RateSourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        ExchangeRate::new(self.draw())
    }
}
