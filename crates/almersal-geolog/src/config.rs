//! Location logger configuration, loaded from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Port the tracker clients report to.
pub const DEFAULT_GEOLOG_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct GeologConfig {
    /// Socket address to listen on.
    /// Env: `HTTP_ADDR` (full address) or `PORT` (port only)
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// JSON Lines file holding every ping. `None` keeps pings in memory
    /// only.
    /// Env: `PING_LOG_PATH` (empty string selects memory)
    /// Default: `./logs.jsonl`
    pub ping_log_path: Option<PathBuf>,

    /// When set, the full history is written here as a JSON array on
    /// shutdown.
    /// Env: `PING_EXPORT_PATH`
    pub export_path: Option<PathBuf>,
}

impl Default for GeologConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_GEOLOG_PORT).into(),
            ping_log_path: Some(PathBuf::from("./logs.jsonl")),
            export_path: None,
        }
    }
}

impl GeologConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(p) => config.http_addr.set_port(p),
                Err(_) => tracing::warn!(value = %port, "Invalid PORT, using default"),
            }
        }

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, ignoring");
            }
        }

        if let Some(path) = lookup("PING_LOG_PATH") {
            config.ping_log_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }

        if let Some(path) = lookup("PING_EXPORT_PATH") {
            if !path.is_empty() {
                config.export_path = Some(PathBuf::from(path));
            }
        }

        config
    }
}
