use rusqlite::{params, OptionalExtension};

use almersal_shared::Role;

use crate::database::Database;
use crate::error::{conversion_err, Result, StoreError};
use crate::models::User;

/// bcrypt work factor used for new accounts.
const BCRYPT_COST: u32 = 10;

impl Database {
    /// Register a staff account. The password is stored as a bcrypt hash.
    pub fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
        role: Role,
    ) -> Result<User> {
        let email = email.trim().to_lowercase();
        let hash = bcrypt::hash(password, BCRYPT_COST)?;

        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO users (email, name, password_hash, role)
             VALUES (?1, ?2, ?3, ?4)",
            params![email, name, hash, role.as_str()],
        )?;
        if affected == 0 {
            return Err(StoreError::DuplicateEmail(email));
        }

        tracing::info!(email = %email, role = role.as_str(), "created user");

        Ok(User {
            id: self.conn().last_insert_rowid(),
            email,
            name: name.map(str::to_string),
            role,
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        Ok(self
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }

    /// The account registered under `email` together with its stored
    /// bcrypt hash. Check the hash with [`verify_password`] once the
    /// database is no longer needed.
    pub fn credentials_for(&self, email: &str) -> Result<Option<(User, String)>> {
        let found = self
            .conn()
            .query_row(
                "SELECT id, email, name, role, password_hash FROM users WHERE email = ?1",
                params![email.trim().to_lowercase()],
                |row| Ok((row_to_user(row)?, row.get(4)?)),
            )
            .optional()?;
        Ok(found)
    }
}

/// Check `password` against a stored bcrypt hash. CPU-bound: keep it off
/// the async executor and out of any database lock.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    let role: Role = role_str.parse().map_err(|e| conversion_err(3, e))?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role,
    })
}
