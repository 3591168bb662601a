//! Bearer-token sessions.
//!
//! Tokens are 32 random bytes, hex encoded. Only the BLAKE3 hash of a token
//! is stored, so a leaked database does not leak live sessions.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rusqlite::{params, OptionalExtension};

use almersal_shared::constants::SESSION_TOKEN_SIZE;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{format_ts, IssuedSession, User};
use crate::users::row_to_user;

fn hash_token(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl Database {
    pub fn create_session(&self, user: &User, ttl: Duration) -> Result<IssuedSession> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or(StoreError::SessionTtl)?;

        self.conn().execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                hash_token(&token),
                user.id,
                format_ts(&now),
                format_ts(&expires_at),
            ],
        )?;

        tracing::debug!(user_id = user.id, "issued session");

        Ok(IssuedSession {
            token,
            user: user.clone(),
            expires_at,
        })
    }

    /// Resolve a bearer token to its user, if the session exists and has
    /// not expired at `now`.
    pub fn resolve_session(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT u.id, u.email, u.name, u.role
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token_hash = ?1 AND s.expires_at > ?2",
                params![hash_token(token), format_ts(&now)],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn revoke_session(&self, token: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM sessions WHERE token_hash = ?1",
            params![hash_token(token)],
        )?;
        Ok(affected > 0)
    }

    /// Delete sessions that expired before `now`. Returns how many went.
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![format_ts(&now)],
        )?;
        Ok(affected)
    }
}
