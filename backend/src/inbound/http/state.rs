//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain services and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{
    CarRepository, LeadRepository, PasswordHasher, ReservationStore, UserRepository,
};
use crate::domain::{AuthService, CustomerService, InventoryService, LeadService, ReservationService};

/// Parameter object bundling the port implementations behind the services.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub cars: Arc<dyn CarRepository>,
    pub reservations: Arc<dyn ReservationStore>,
    pub leads: Arc<dyn LeadRepository>,
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    /// Bound on each reservation store call.
    pub store_timeout: Duration,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub customers: CustomerService,
    pub inventory: InventoryService,
    pub leads: LeadService,
    pub auth: AuthService,
}

impl HttpState {
    /// Wire the domain services over the given ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use dealership::inbound::http::state::{HttpState, HttpStatePorts};
    /// use dealership::test_support::{
    ///     InMemoryCarStore, InMemoryLeadRepository, InMemoryUserRepository, PlainPasswordHasher,
    /// };
    ///
    /// let cars = InMemoryCarStore::new();
    /// let state = HttpState::new(HttpStatePorts {
    ///     cars: Arc::new(cars.clone()),
    ///     reservations: Arc::new(cars),
    ///     leads: Arc::new(InMemoryLeadRepository::new()),
    ///     users: Arc::new(InMemoryUserRepository::new()),
    ///     hasher: Arc::new(PlainPasswordHasher),
    ///     store_timeout: Duration::from_secs(5),
    /// });
    /// let _customers = state.customers.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            cars,
            reservations,
            leads,
            users,
            hasher,
            store_timeout,
        } = ports;
        let booking = ReservationService::new(reservations, store_timeout);
        Self {
            customers: CustomerService::new(Arc::clone(&cars), booking),
            inventory: InventoryService::new(cars, Arc::clone(&leads)),
            leads: LeadService::new(leads),
            auth: AuthService::new(users, hasher),
        }
    }
}
