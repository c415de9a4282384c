//! Price recomputation policy: rounding and materiality.

use crate::domain::ports::{ExchangeRate, RepricingCandidate};

/// Outcome of evaluating one car against a rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDecision {
    /// The change exceeds the materiality threshold; write `price_kzt`.
    Update { price_kzt: f64 },
    /// The stored value is close enough; skip the write.
    Keep { candidate: f64 },
}

/// Rounding granularity and absolute write threshold.
///
/// # Examples
/// ```
/// use dealership::domain::pricing_worker::{PriceDecision, RepricingPolicy};
/// use dealership::domain::ports::{ExchangeRate, RepricingCandidate};
/// use dealership::domain::CarId;
///
/// let policy = RepricingPolicy::new(Some(1_000.0), 100.0);
/// let car = RepricingCandidate { id: CarId::random(), price_usd: 20_000.0, price_kzt: 10_500_000.0 };
/// let rate = ExchangeRate::new(526.0).unwrap();
/// assert_eq!(policy.decide(&car, rate), PriceDecision::Update { price_kzt: 10_520_000.0 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepricingPolicy {
    rounding_step: Option<f64>,
    materiality_threshold: f64,
}

impl RepricingPolicy {
    /// A non-positive or non-finite `rounding_step` disables rounding; a
    /// negative threshold is treated as zero.
    pub fn new(rounding_step: Option<f64>, materiality_threshold: f64) -> Self {
        Self {
            rounding_step: rounding_step.filter(|step| step.is_finite() && *step > 0.0),
            materiality_threshold: materiality_threshold.max(0.0),
        }
    }

    /// `price_usd * rate`, rounded to the nearest step.
    pub fn candidate_price(&self, price_usd: f64, rate: ExchangeRate) -> f64 {
        let raw = price_usd * rate.value();
        match self.rounding_step {
            Some(step) => (raw / step).round() * step,
            None => raw,
        }
    }

    /// Write the candidate only when it differs from the stored price by
    /// more than the materiality threshold.
    pub fn decide(&self, car: &RepricingCandidate, rate: ExchangeRate) -> PriceDecision {
        let candidate = self.candidate_price(car.price_usd, rate);
        if (candidate - car.price_kzt).abs() > self.materiality_threshold {
            PriceDecision::Update {
                price_kzt: candidate,
            }
        } else {
            PriceDecision::Keep { candidate }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CarId;
    use rstest::rstest;

    fn car(price_usd: f64, price_kzt: f64) -> RepricingCandidate {
        RepricingCandidate {
            id: CarId::random(),
            price_usd,
            price_kzt,
        }
    }

    fn rate(value: f64) -> ExchangeRate {
        ExchangeRate::new(value).expect("valid rate")
    }

    #[rstest]
    #[case(525.0, PriceDecision::Keep { candidate: 10_500_000.0 })]
    #[case(526.0, PriceDecision::Update { price_kzt: 10_520_000.0 })]
    fn documented_examples(#[case] value: f64, #[case] expected: PriceDecision) {
        let policy = RepricingPolicy::new(Some(1_000.0), 100.0);
        assert_eq!(policy.decide(&car(20_000.0, 10_500_000.0), rate(value)), expected);
    }

    #[rstest]
    #[case(Some(1_000.0), 10_524_000.0)]
    #[case(Some(100_000.0), 10_500_000.0)]
    #[case(None, 10_524_120.0)]
    #[case(Some(0.0), 10_524_120.0)]
    fn rounding_step_controls_granularity(#[case] step: Option<f64>, #[case] expected: f64) {
        let policy = RepricingPolicy::new(step, 100.0);
        let candidate = policy.candidate_price(20_000.0, rate(526.206));
        assert!((candidate - expected).abs() < 1e-6, "got {candidate}");
    }

    #[rstest]
    #[case(10_500_100.0, false)]
    #[case(10_500_101.0, true)]
    #[case(10_499_899.0, true)]
    fn threshold_is_absolute_and_strict(#[case] stored: f64, #[case] writes: bool) {
        let policy = RepricingPolicy::new(None, 100.0);
        let decision = policy.decide(&car(20_000.0, stored), rate(525.0));
        assert_eq!(matches!(decision, PriceDecision::Update { .. }), writes);
    }
}
