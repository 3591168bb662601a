//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `users`, `remittances` and `settings`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users (staff accounts)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    name          TEXT,
    password_hash TEXT NOT NULL,               -- bcrypt
    role          TEXT NOT NULL DEFAULT 'EMPLOYEE'
                  CHECK (role IN ('ADMIN', 'EMPLOYEE'))
);

-- ----------------------------------------------------------------
-- Remittances
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS remittances (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    internal_id   INTEGER NOT NULL UNIQUE,     -- receipt number
    provider      TEXT NOT NULL,               -- WU | RIA | MG | WAVE | OM
    channel       TEXT NOT NULL,               -- CASH | MOBILE
    amount_mru    TEXT NOT NULL,               -- decimal string
    dest_country  TEXT NOT NULL,
    dest_currency TEXT NOT NULL,
    tracking      TEXT NOT NULL,
    fee           TEXT NOT NULL,
    provider_fee  TEXT NOT NULL,
    total         TEXT NOT NULL,
    qr            TEXT NOT NULL,               -- PNG data URL
    created_by    INTEGER NOT NULL,
    created_at    TEXT NOT NULL,               -- RFC-3339, UTC, fixed width

    FOREIGN KEY (created_by) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_remittances_created_at ON remittances(created_at);
CREATE INDEX IF NOT EXISTS idx_remittances_tracking ON remittances(tracking);

-- ----------------------------------------------------------------
-- Settings (singleton)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    office_name     TEXT NOT NULL,
    address         TEXT NOT NULL,
    phone           TEXT NOT NULL,
    logo_url        TEXT,
    policies        TEXT NOT NULL,
    monthly_expense TEXT NOT NULL DEFAULT '0'
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
