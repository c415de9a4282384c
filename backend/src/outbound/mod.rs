//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories and the reservation
//!   store using Diesel ORM
//! - **rates**: exchange-rate feeds for the pricing worker
//! - **security**: bcrypt password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
pub mod rates;
pub mod security;
