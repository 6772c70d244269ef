//! Stance Server - entry point for the study API
//!
//! Thin wrapper around `stance-api`: reads `.env`, configures tracing and
//! runs the server until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use stance_api::{ServerConfig, StanceServer};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real deployments set the environment directly
    let dotenv = dotenvy::dotenv();

    stance_api::server::init_tracing();
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting stance server");

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    let server = StanceServer::new(config).await.map_err(|e| {
        tracing::error!("Failed to initialize server: {}", e);
        e
    })?;

    server.run().await.map_err(|e| {
        tracing::error!("Server error during execution: {}", e);
        e
    })?;

    Ok(())
}
