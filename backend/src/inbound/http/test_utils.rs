//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, web};
use chrono::{TimeDelta, Utc};
use rstest::fixture;

use crate::domain::{Role, User, UserId, Username};
use crate::inbound::http::auth::TokenIssuer;
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::middleware::trace_requests;
use crate::test_support::{
    InMemoryCarStore, InMemoryLeadRepository, InMemoryUserRepository, PlainPasswordHasher,
};

pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret";

/// In-memory ports plus the issuer the test app verifies tokens with.
pub struct TestHarness {
    pub cars: InMemoryCarStore,
    pub users: Arc<InMemoryUserRepository>,
    pub leads: Arc<InMemoryLeadRepository>,
    pub issuer: TokenIssuer,
}

#[fixture]
pub fn harness() -> TestHarness {
    TestHarness {
        cars: InMemoryCarStore::new(),
        users: Arc::new(InMemoryUserRepository::new()),
        leads: Arc::new(InMemoryLeadRepository::new()),
        issuer: TokenIssuer::new(TEST_SECRET, TimeDelta::hours(1)).expect("test issuer"),
    }
}

impl TestHarness {
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let state = HttpState::new(HttpStatePorts {
            cars: Arc::new(self.cars.clone()),
            reservations: Arc::new(self.cars.clone()),
            leads: self.leads.clone(),
            users: self.users.clone(),
            hasher: Arc::new(PlainPasswordHasher),
            store_timeout: Duration::from_secs(5),
        });
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(self.issuer.clone()))
            .wrap(from_fn(trace_requests))
            .configure(configure_api)
    }

    /// Store an account whose password verifies with [`PlainPasswordHasher`].
    pub fn add_user(&self, username: &str, password: &str, role: Role) -> User {
        let user = User {
            id: UserId::random(),
            username: Username::new(username).expect("valid username"),
            password_hash: format!("plain${password}"),
            role,
            created_at: Utc::now(),
        };
        self.users.insert(user.clone());
        user
    }

    /// `Authorization` header value for a fresh account with `role`.
    pub fn bearer(&self, username: &str, role: Role) -> (User, String) {
        let user = self.add_user(username, "secret1", role);
        let token = self.issuer.issue(&user).expect("token").token;
        (user, format!("Bearer {token}"))
    }
}
