//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use dealership::domain::reservation::DEFAULT_STORE_TIMEOUT;
use dealership::inbound::http::auth::TokenIssuer;
use dealership::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) issuer: TokenIssuer,
    pub(crate) store_timeout: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, issuer: TokenIssuer) -> Self {
        Self {
            bind_addr,
            db_pool,
            issuer,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Bound each reservation store call.
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}
