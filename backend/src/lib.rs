//! Dealership back end: car inventory, test-drive reservations and
//! exchange-rate driven local pricing.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
