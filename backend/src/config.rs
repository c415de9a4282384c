//! Server settings loaded via OrthoConfig.
//!
//! Values come from `DEALERSHIP_*` environment variables, CLI flags or a
//! configuration file. Accessors turn the raw values into the typed settings
//! each component takes and reject combinations the server cannot run with.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::PricingWorkerConfig;
use crate::inbound::http::auth::MIN_SECRET_LEN;
use crate::outbound::persistence::PoolConfig;
use crate::outbound::rates::SimulatedRateConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings that cannot be turned into a runnable server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("bind address `{0}` is not a socket address")]
    BindAddr(String),
    #[error("jwt secret must be at least {min} bytes")]
    SecretTooShort { min: usize },
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
    #[error("rate source url `{0}` is not valid")]
    RateSourceUrl(String),
}

/// Configuration for the `dealership` server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEALERSHIP")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: Option<String>,
    #[ortho_config(default = 24)]
    pub token_ttl_hours: i64,
    #[ortho_config(default = 86_400)]
    pub pricing_period_secs: u64,
    /// `0` disables rounding.
    #[ortho_config(default = 1_000.0)]
    pub pricing_rounding_step: f64,
    #[ortho_config(default = 100.0)]
    pub pricing_materiality_threshold: f64,
    /// Bound on each store call made by the reservation core and the worker.
    #[ortho_config(default = 5_000)]
    pub store_timeout_ms: u64,
    /// Upstream rate endpoint; the simulated feed is used when absent.
    pub rate_source_url: Option<String>,
    #[ortho_config(default = 520.0)]
    pub simulated_rate_min: f64,
    #[ortho_config(default = 530.0)]
    pub simulated_rate_max: f64,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
}

impl AppSettings {
    /// Pool settings for the configured database.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing("database_url"))?;
        if self.db_max_connections == 0 {
            return Err(SettingsError::NotPositive {
                field: "db_max_connections",
            });
        }
        Ok(PoolConfig::new(url).with_max_size(self.db_max_connections))
    }

    /// Listen address; `0.0.0.0:8080` when unset.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|_| SettingsError::BindAddr(raw.to_owned()))
    }

    /// Signing secret and token lifetime.
    pub fn token_settings(&self) -> Result<(&str, TimeDelta), SettingsError> {
        let secret = self
            .jwt_secret
            .as_deref()
            .ok_or(SettingsError::Missing("jwt_secret"))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(SettingsError::SecretTooShort {
                min: MIN_SECRET_LEN,
            });
        }
        if self.token_ttl_hours <= 0 {
            return Err(SettingsError::NotPositive {
                field: "token_ttl_hours",
            });
        }
        Ok((secret, TimeDelta::hours(self.token_ttl_hours)))
    }

    /// Bound on each reservation store call.
    pub fn store_timeout(&self) -> Result<Duration, SettingsError> {
        if self.store_timeout_ms == 0 {
            return Err(SettingsError::NotPositive {
                field: "store_timeout_ms",
            });
        }
        Ok(Duration::from_millis(self.store_timeout_ms))
    }

    /// Worker settings. A rounding step of zero or less disables rounding.
    pub fn pricing_config(&self) -> Result<PricingWorkerConfig, SettingsError> {
        if self.pricing_period_secs == 0 {
            return Err(SettingsError::NotPositive {
                field: "pricing_period_secs",
            });
        }
        let rounding_step = (self.pricing_rounding_step > 0.0).then_some(self.pricing_rounding_step);
        Ok(PricingWorkerConfig {
            period: Duration::from_secs(self.pricing_period_secs),
            rounding_step,
            materiality_threshold: self.pricing_materiality_threshold.max(0.0),
            call_timeout: self.store_timeout()?,
        })
    }

    /// Upstream rate endpoint, if one is configured.
    pub fn rate_source_url(&self) -> Result<Option<Url>, SettingsError> {
        self.rate_source_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Url::parse(raw).map_err(|_| SettingsError::RateSourceUrl(raw.to_owned())))
            .transpose()
    }

    /// Range used when no upstream rate URL is configured.
    pub fn simulated_rate(&self) -> SimulatedRateConfig {
        SimulatedRateConfig {
            min: self.simulated_rate_min,
            max: self.simulated_rate_max,
            ..SimulatedRateConfig::default()
        }
    }
}
