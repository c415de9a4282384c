//! Driven port supplying the USD to KZT exchange rate.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures fetching the current rate.
    pub enum RateSourceError {
        /// The upstream could not be reached.
        Transport => "rate source transport failed",
        /// The upstream did not answer in time.
        Timeout => "rate source timed out",
        /// The upstream answered with an unreadable payload.
        Decode => "rate source response decode failed",
        /// The upstream answered with a zero, negative or non-finite rate.
        InvalidRate => "rate source returned an invalid rate",
    }
}

/// Units of local currency per US dollar. Always finite and positive.
///
/// ```
/// use dealership::domain::ports::ExchangeRate;
///
/// assert!(ExchangeRate::new(525.0).is_ok());
/// assert!(ExchangeRate::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    /// Validate a raw rate.
    pub fn new(rate: f64) -> Result<Self, RateSourceError> {
        if rate.is_finite() && rate > 0.0 {
            Ok(Self(rate))
        } else {
            Err(RateSourceError::invalid_rate(rate.to_string()))
        }
    }

    /// Raw rate value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Supplies the current USD to KZT rate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Fetch the current rate. Called once per pricing cycle.
    async fn current_rate(&self) -> Result<ExchangeRate, RateSourceError>;
}
