use thiserror::Error;

use almersal_shared::{QrError, ValidationError};

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// An account with this email already exists.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Session lifetime pushes the expiry past the representable range.
    #[error("Session lifetime out of range")]
    SessionTtl,

    /// Password hashing failure.
    #[error("Password hash error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    /// Receipt QR rendering failure.
    #[error("QR error: {0}")]
    Qr(#[from] QrError),

    /// Stored value failed domain validation (enum codes, roles).
    #[error("Invalid stored value: {0}")]
    Validation(#[from] ValidationError),

    /// Decimal parsing error.
    #[error("Decimal parse error: {0}")]
    Decimal(#[from] rust_decimal::Error),

    /// Chrono parsing error.
    #[error("Timestamp parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Map a "no rows" error to [`StoreError::NotFound`].
pub(crate) fn not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}

/// Wrap a column decoding failure so it surfaces through rusqlite.
pub(crate) fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}
