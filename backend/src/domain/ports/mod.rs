//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven adapters (Diesel, HTTP rate feeds, bcrypt) implement these traits;
//! domain services depend only on `Arc<dyn Port>` values.

mod macros;
pub(crate) use macros::define_port_error;

mod car_repository;
mod exchange_rate_source;
mod lead_repository;
mod password_hasher;
mod repricing_repository;
mod reservation_store;
mod user_repository;

#[cfg(test)]
pub use car_repository::MockCarRepository;
pub use car_repository::{CarRepository, CarStoreError};
#[cfg(test)]
pub use exchange_rate_source::MockExchangeRateSource;
pub use exchange_rate_source::{ExchangeRate, ExchangeRateSource, RateSourceError};
#[cfg(test)]
pub use lead_repository::MockLeadRepository;
pub use lead_repository::{LeadRepository, LeadRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use repricing_repository::MockRepricingRepository;
pub use repricing_repository::{RepricingCandidate, RepricingRepository};
#[cfg(test)]
pub use reservation_store::{MockReservationStore, MockReservationTransaction};
pub use reservation_store::{ReservationStore, ReservationTransaction};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
