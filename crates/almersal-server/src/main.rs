//! # almersal-server
//!
//! HTTP API for the Al Mersal remittance office.
//!
//! This binary provides:
//! - **Staff sign-in** with bcrypt-checked passwords and bearer sessions
//! - **Remittance submission** with tiered fees, sequential receipt numbers
//!   and QR codes
//! - **Bilingual receipts** (English/Arabic), customer and office copies
//! - **Settings and dashboard** views over the ledger
//! - **Per-IP rate limiting** to protect against abuse

mod api;
mod auth;
mod config;
mod error;
mod rate_limit;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use almersal_shared::{Messages, Role, Settings};
use almersal_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::rate_limit::{signin_limiter, RateLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,almersal_server=debug")),
        )
        .init();

    info!("Starting Al Mersal server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Load receipt labels, open the ledger and seed first-run data
    // -----------------------------------------------------------------------
    Messages::preload()?;

    let db = Database::open_at(&config.database_path)?;
    if let Some(path) = db.path() {
        info!(path = %path.display(), "Ledger ready");
    }
    bootstrap(&db, &config)?;

    let rate_limiter = RateLimiter::default();
    let app_state = AppState {
        db: Arc::new(Mutex::new(db)),
        rate_limiter: rate_limiter.clone(),
        signin_limiter: signin_limiter(),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Periodic rate limiter cleanup (every 5 minutes, evict buckets idle >10 min)
    let rl = rate_limiter.clone();
    let sl = app_state.signin_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rl.purge_stale(600.0).await;
            sl.purge_stale(3600.0).await;
        }
    });

    // Expired session cleanup (every 10 minutes)
    let db = app_state.db.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            match db.lock().await.purge_expired_sessions(chrono::Utc::now()) {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "Expired sessions removed"),
                Err(e) => tracing::warn!(error = %e, "Session purge failed"),
            }
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

/// Create the settings row and, on an empty users table, the admin account.
fn bootstrap(db: &Database, config: &ServerConfig) -> anyhow::Result<()> {
    let seeded = db.seed_settings(&Settings {
        office_name: config.office_name.clone(),
        ..Settings::default()
    })?;
    if seeded {
        info!(office = %config.office_name, "Seeded default settings");
    }

    if db.count_users()? > 0 {
        return Ok(());
    }

    match &config.admin_password {
        Some(password) => {
            db.create_user(
                &config.admin_email,
                Some(&config.admin_name),
                password,
                Role::Admin,
            )?;
            info!(email = %config.admin_email, "Created bootstrap admin account");
        }
        None => {
            tracing::warn!("No users exist and ADMIN_PASSWORD is unset; nobody can sign in");
        }
    }

    Ok(())
}
