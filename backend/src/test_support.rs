//! In-memory adapters and runtime doubles shared by unit and integration
//! tests.
//!
//! Compiled for `cfg(test)` and for the `test-support` feature so the
//! `tests/` suites can drive the HTTP layer without PostgreSQL.

pub mod accounts;
pub mod car_store;
pub mod runtime;

pub use accounts::{InMemoryLeadRepository, InMemoryUserRepository, PlainPasswordHasher};
pub use car_store::InMemoryCarStore;
pub use runtime::{
    FailingRateSource, FixedRateSource, MutableClock, ParkingSleeper, SequenceRateSource,
};
