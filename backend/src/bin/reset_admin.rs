//! Create the administrator account or reset its password.
//!
//! The account is read back after the write and the new password is checked
//! against the stored bcrypt hash before the tool reports success.

use std::env;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use dealership::domain::{AuthService, CredentialReset, PASSWORD_MIN, Role, Username};
use dealership::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use dealership::outbound::security::BcryptPasswordHasher;

/// `reset-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reset-admin",
    about = "Create or reset the dealership administrator account",
    version
)]
struct CliArgs {
    /// New password for the account.
    #[arg(long, value_name = "password")]
    password: String,
    #[arg(long, value_name = "name", default_value = "admin")]
    username: String,
    /// Database connection URL. Falls back to `DEALERSHIP_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let password = Zeroizing::new(args.password);
    if password.chars().count() < PASSWORD_MIN {
        return Err(eyre!("password must be at least {PASSWORD_MIN} characters"));
    }
    let username = Username::new(args.username).wrap_err("invalid username")?;
    let database_url = resolve_database_url(args.database_url)?;

    run_pending_migrations(&database_url)
        .await
        .wrap_err("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("create database pool")?;
    let auth = AuthService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(BcryptPasswordHasher::default()),
    );

    let outcome = auth
        .reset_credentials(&username, &password, Role::Admin)
        .await
        .map_err(|err| eyre!("credential reset failed: {}", err.message()))?;
    match outcome {
        CredentialReset::Created => info!(%username, "administrator created; hash verified"),
        CredentialReset::Updated => info!(%username, "administrator password reset; hash verified"),
    }
    Ok(())
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    explicit
        .or_else(|| env::var("DEALERSHIP_DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| eyre!("pass --database-url or set DEALERSHIP_DATABASE_URL"))
}
