//! Builds the HTTP state from PostgreSQL-backed adapters.

use std::sync::Arc;

use actix_web::web;

use dealership::inbound::http::state::{HttpState, HttpStatePorts};
use dealership::outbound::persistence::{
    DbPool, DieselCarRepository, DieselLeadRepository, DieselReservationStore,
    DieselUserRepository,
};
use dealership::outbound::security::BcryptPasswordHasher;

use super::ServerConfig;

pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(diesel_ports(
        &config.db_pool,
        config.store_timeout,
    )))
}

fn diesel_ports(pool: &DbPool, store_timeout: std::time::Duration) -> HttpStatePorts {
    HttpStatePorts {
        cars: Arc::new(DieselCarRepository::new(pool.clone())),
        reservations: Arc::new(
            DieselReservationStore::new(pool.clone()).with_lock_timeout(store_timeout),
        ),
        leads: Arc::new(DieselLeadRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        hasher: Arc::new(BcryptPasswordHasher::default()),
        store_timeout,
    }
}
