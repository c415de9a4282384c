//! Backend entry-point: applies migrations, starts the pricing worker and
//! serves the REST API until the process is signalled.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dealership::config::AppSettings;
use dealership::domain::ports::ExchangeRateSource;
use dealership::domain::pricing_worker::PricingWorkerPorts;
use dealership::domain::PricingWorker;
use dealership::inbound::http::auth::TokenIssuer;
use dealership::inbound::http::health::HealthState;
use dealership::outbound::persistence::{
    DbPool, DieselCarRepository, run_pending_migrations,
};
use dealership::outbound::rates::{HttpRateSource, SimulatedRateSource};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("load settings")?;
    let pool_config = settings.pool_config()?;
    let (secret, ttl) = settings.token_settings()?;
    let issuer = TokenIssuer::new(secret, ttl)?;
    let pricing = settings.pricing_config()?;

    run_pending_migrations(pool_config.database_url())
        .await
        .wrap_err("apply migrations")?;
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("build database pool")?;

    let rate_source = build_rate_source(&settings, pricing.call_timeout)?;
    let worker = PricingWorker::new(
        PricingWorkerPorts::new(
            rate_source,
            Arc::new(DieselCarRepository::new(pool.clone())),
        ),
        pricing,
    )
    .spawn();

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = settings.bind_addr()?;
    let config = ServerConfig::new(bind_addr, pool, issuer)
        .with_store_timeout(settings.store_timeout()?);
    let server = create_server(health_state.clone(), config)?;
    health_state.mark_ready();
    info!(%bind_addr, "dealership listening");

    let served = server.await;
    health_state.mark_unhealthy();
    worker.shutdown().await;
    served.wrap_err("http server failed")
}

fn build_rate_source(
    settings: &AppSettings,
    timeout: std::time::Duration,
) -> Result<Arc<dyn ExchangeRateSource>> {
    match settings.rate_source_url()? {
        Some(url) => {
            info!(%url, "using upstream exchange rate source");
            let source = HttpRateSource::new(url, timeout).wrap_err("build rate client")?;
            Ok(Arc::new(source))
        }
        None => {
            let simulated = settings.simulated_rate();
            info!(min = simulated.min, max = simulated.max, "using simulated exchange rate");
            Ok(Arc::new(SimulatedRateSource::new(simulated)?))
        }
    }
}
