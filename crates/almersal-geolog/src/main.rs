//! # almersal-geolog
//!
//! Minimal location logger: `GET /log?uid=&lat=&lon=` records a GPS ping,
//! `GET /data/{uid}` returns that user's history. No authentication.

mod api;
mod config;
mod error;
mod ping_log;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::GeologConfig;
use crate::ping_log::{export_json, FilePingLog, MemoryPingLog, PingLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,almersal_geolog=debug")),
        )
        .init();

    info!("Starting Al Mersal location logger v{}", env!("CARGO_PKG_VERSION"));

    let config = GeologConfig::from_env();
    info!(?config, "Loaded configuration");

    let log: Arc<dyn PingLog> = match &config.ping_log_path {
        Some(path) => {
            let file_log = FilePingLog::open(path).await?;
            info!(path = %file_log.path().display(), "Ping log ready");
            Arc::new(file_log)
        }
        None => {
            tracing::warn!("PING_LOG_PATH is empty, pings will not survive a restart");
            Arc::new(MemoryPingLog::new())
        }
    };

    let state = AppState { log: log.clone() };

    tokio::select! {
        result = api::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    if let Some(dest) = &config.export_path {
        export_json(log.as_ref(), dest).await?;
    }

    Ok(())
}
