//! # almersal-store
//!
//! SQLite storage for the Al Mersal ledger.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for staff accounts,
//! sessions, remittances, the settings singleton and dashboard aggregates.

pub mod dashboard;
pub mod database;
pub mod migrations;
pub mod models;
pub mod remittances;
pub mod sessions;
pub mod settings;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
