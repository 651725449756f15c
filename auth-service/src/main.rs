//! Main entry point for the authentication service.
//!
//! Initializes tracing, loads configuration, opens the database, wires the
//! session service into the Axum router and serves it until shutdown.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use auth::handlers::CookiePolicy;
use auth::service::AuthService;
use config::Config;
use database::Database;
use repositories::auth_repository::SqliteAuthRepository;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utils::jwt::JwtUtils;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;

    let repo = Arc::new(SqliteAuthRepository::new(db.pool().clone()));
    let auth_service = Arc::new(AuthService::new(repo, JwtUtils::new(&config)));
    let policy = CookiePolicy {
        secure: config.production,
        max_age_seconds: config.refresh_token_ttl_seconds,
    };

    let app = api::app(auth_service, policy);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    info!(
        production = config.production,
        "Starting auth service on port {}", config.server_port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
