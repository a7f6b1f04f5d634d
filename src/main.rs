//! imulog server
//!
//! Run with: cargo run --bin imulog -- [--config path/to/config.toml]
//!
//! The device connects to `ws://<host>:<port>/` and streams
//! `{"ax": .., "ay": .., "az": ..}` frames; dashboards poll `/data` and the
//! `/api/*` routes.
//!
//! # Configuration
//!
//! See `imulog-cli config` for a commented template. Environment variables
//! (`IMULOG_BACKEND`, `IMULOG_DATA_DIR`, `IMULOG_HOST`, `IMULOG_PORT`,
//! `IMULOG_LOG_LEVEL`, `IMULOG_LOG_FORMAT`) override the file; `RUST_LOG`
//! overrides the log level.

use anyhow::Context;
use clap::Parser;
use imulog::api::{serve, AppState};
use imulog::config::Config;
use imulog::storage::StorageEngine;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "imulog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "IMU telemetry recorder")]
struct Args {
    /// Config file (default: standard locations, then environment)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = imulog::logging::with_bootstrap("info", || Config::resolve(args.config.as_deref()))?;

    imulog::logging::init(&config.logging, std::io::stdout)
        .context("failed to initialize logging")?;

    tracing::info!("Starting imulog v{}", env!("CARGO_PKG_VERSION"));

    let storage_config = config.storage.to_storage_config();
    tracing::info!(
        backend = %storage_config.backend,
        path = ?storage_config.history_path(),
        "Opening history store"
    );

    let storage = Arc::new(
        StorageEngine::new(storage_config)
            .await
            .context("failed to open history store")?,
    );

    let state = AppState::from_storage(storage, config.api.clone());
    serve(state, &config.api).await?;

    tracing::info!("imulog stopped");
    Ok(())
}
