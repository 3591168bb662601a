//! Domain model structs persisted in the SQLite database.
//!
//! Ledger records (`Remittance`, `Settings`) live in `almersal-shared` so the
//! receipt renderer can use them; they are re-exported here.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use almersal_shared::Role;

pub use almersal_shared::models::{DashboardSummary, NewRemittance, Remittance, Settings};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A staff account. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A freshly issued session. `token` is only available at creation time;
/// the database stores its hash.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Fixed-width UTC RFC 3339 so that string order matches time order.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
