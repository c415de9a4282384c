//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};

use dealership::inbound::http::auth::TokenIssuer;
use dealership::inbound::http::configure_api;
use dealership::inbound::http::health::{HealthState, live, ready};
use dealership::inbound::http::state::HttpState;
use dealership::middleware::trace_requests;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    issuer: web::Data<TokenIssuer>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        issuer,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(issuer)
        .wrap(from_fn(trace_requests))
        .configure(configure_api)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is left to the caller so it can flip once the pricing worker
/// is running too.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let ServerConfig {
        bind_addr,
        db_pool: _,
        issuer,
        store_timeout: _,
    } = config;
    let issuer = web::Data::new(issuer);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: health_state.clone(),
            http_state: http_state.clone(),
            issuer: issuer.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
