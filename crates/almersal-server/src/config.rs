//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use almersal_shared::constants::{APP_NAME, DEFAULT_HTTP_PORT, DEFAULT_SESSION_TTL_HOURS};

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `./almersal.db`
    pub database_path: PathBuf,

    /// Bootstrap admin account, created only when the users table is empty
    /// and a password is configured.
    /// Env: `ADMIN_EMAIL`, `ADMIN_PASSWORD`, `ADMIN_NAME`
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub admin_name: String,

    /// Lifetime of a sign-in session.
    /// Env: `SESSION_TTL_HOURS`
    /// Default: `12`
    pub session_ttl_hours: i64,

    /// Accept zero and negative amounts on submission.
    /// Env: `ALLOW_NON_POSITIVE_AMOUNTS` (true/false)
    /// Default: `false`
    pub allow_non_positive_amounts: bool,

    /// Office name written to the settings row on first start.
    /// Env: `OFFICE_NAME`
    /// Default: `"Al Mersal"`
    pub office_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: PathBuf::from("./almersal.db"),
            admin_email: "admin@almersal.local".to_string(),
            admin_password: None,
            admin_name: "Admin".to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            allow_non_positive_amounts: false,
            office_name: APP_NAME.to_string(),
        }
    }
}

// Hand-written so the admin password never reaches the logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("database_path", &self.database_path)
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("admin_name", &self.admin_name)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("allow_non_positive_amounts", &self.allow_non_positive_amounts)
            .field("office_name", &self.office_name)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(email) = lookup("ADMIN_EMAIL") {
            if !email.trim().is_empty() {
                config.admin_email = email.trim().to_string();
            }
        }

        if let Some(password) = lookup("ADMIN_PASSWORD") {
            if !password.is_empty() {
                config.admin_password = Some(password);
            }
        }

        if let Some(name) = lookup("ADMIN_NAME") {
            config.admin_name = name;
        }

        if let Some(val) = lookup("SESSION_TTL_HOURS") {
            match val.parse::<i64>() {
                Ok(hours) if hours > 0 && ttl_in_range(hours) => config.session_ttl_hours = hours,
                _ => tracing::warn!(value = %val, "Invalid SESSION_TTL_HOURS, using default"),
            }
        }

        if let Some(val) = lookup("ALLOW_NON_POSITIVE_AMOUNTS") {
            config.allow_non_positive_amounts = val == "true" || val == "1";
        }

        if let Some(name) = lookup("OFFICE_NAME") {
            config.office_name = name;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.session_ttl_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

/// A session opened now with this lifetime must have a representable expiry.
fn ttl_in_range(hours: i64) -> bool {
    chrono::Duration::try_hours(hours)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert!(config.admin_password.is_none());
        assert!(!config.allow_non_positive_amounts);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/var/lib/almersal/db.sqlite"),
            ("ADMIN_PASSWORD", "Admin@12345"),
            ("SESSION_TTL_HOURS", "2"),
            ("ALLOW_NON_POSITIVE_AMOUNTS", "true"),
        ]));
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_path, PathBuf::from("/var/lib/almersal/db.sqlite"));
        assert_eq!(config.admin_password.as_deref(), Some("Admin@12345"));
        assert_eq!(config.session_ttl_hours, 2);
        assert!(config.allow_non_positive_amounts);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("SESSION_TTL_HOURS", "-3"),
        ]));
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
    }

    #[test]
    fn test_huge_session_ttl_falls_back() {
        let max = i64::MAX.to_string();
        for hours in ["9000000000000", "3000000000", max.as_str()] {
            let config = ServerConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", hours)]));
            assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS, "{hours}");
            assert_eq!(config.session_ttl(), chrono::Duration::hours(12));
        }

        let config = ServerConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "8760")]));
        assert_eq!(config.session_ttl(), chrono::Duration::days(365));
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = ServerConfig::default();
        config.admin_password = Some("hunter2".into());
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
