// Calculations API - Web Server
// BREAD over per-user calculations with bearer-token auth

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use calculations_api::api::{router, AppState};
use calculations_api::{Config, Database};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db = Database::open(&config.database_path)?;
    info!(path = %config.database_path.display(), "database ready");

    let app = router(AppState::new(db, &config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, token_ttl_minutes = config.token_ttl_minutes, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
}
