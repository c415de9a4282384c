//! Domain primitives, ports and services.
//!
//! Purpose: keep dealership rules (who may book which car, how local
//! prices follow the exchange rate) independent of HTTP and SQL. Adapters
//! in `inbound` and `outbound` depend on this module, never the reverse.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Car, CarStatus, User, Role, Lead and their validated inputs.
//! - ReservationService: the row-locked booking transaction.
//! - PricingWorker: periodic local-price recalculation.
//! - CustomerService, InventoryService, AuthService, LeadService.

pub mod auth;
pub mod auth_service;
pub mod car;
pub mod customer_service;
pub mod error;
pub mod inventory_service;
pub mod lead;
pub mod lead_service;
pub mod ports;
pub mod pricing_worker;
pub mod reservation;
mod store_error_mapping;
pub mod trace_id;
pub mod user;

pub use self::auth::{CredentialsValidationError, LoginCredentials, PASSWORD_MIN, Registration};
pub use self::auth_service::{AuthService, CredentialReset};
pub use self::car::{Car, CarDetails, CarId, CarStatus, CarValidationError, NewCar, PublicCar, Vin};
pub use self::customer_service::CustomerService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::inventory_service::{Dashboard, InventoryService};
pub use self::lead::{INQUIRY_TEST_DRIVE, LEAD_STATUS_NEW, Lead, LeadValidationError, NewLead};
pub use self::lead_service::LeadService;
pub use self::pricing_worker::{
    CycleReport, CycleSkipped, PricingWorker, PricingWorkerConfig, PricingWorkerHandle,
};
pub use self::reservation::{ReservationError, ReservationService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Role, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use dealership::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("staff only"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
