//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the store ports backed by PostgreSQL via
//! `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: pool and Diesel failures map onto each port's error
//!   enum; unique violations become `Duplicate` where the port has one.
//!
//! # Example
//!
//! ```no_run
//! use dealership::outbound::persistence::{DbPool, DieselCarRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/dealership")).await?;
//! let cars = DieselCarRepository::new(pool);
//! # let _ = cars;
//! # Ok(())
//! # }
//! ```

mod diesel_car_repository;
mod diesel_lead_repository;
mod diesel_reservation_store;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_car_repository::DieselCarRepository;
pub use diesel_lead_repository::DieselLeadRepository;
pub use diesel_reservation_store::DieselReservationStore;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
