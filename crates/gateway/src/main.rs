//! `vaultgate` — gateway binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Initialise the S3-backed object store.
//! 4. Create the staging directory for uploads.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod store;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use server::state::AppState;
use store::S3Store;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        bucket = %cfg.aws_bucket,
        "vaultgate starting"
    );

    // -----------------------------------------------------------------------
    // 3. Object store
    // -----------------------------------------------------------------------
    let store = S3Store::init(&cfg).await;

    // -----------------------------------------------------------------------
    // 4. Staging directory
    // -----------------------------------------------------------------------
    let upload_dir = PathBuf::from(&cfg.upload_dir);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .with_context(|| format!("failed to create upload dir: {}", cfg.upload_dir))?;

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        Arc::new(store),
        cfg.auth_token.clone(),
        upload_dir,
        cfg.max_upload_bytes(),
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
