//! Sign-in and per-request principal resolution.
//!
//! Handlers that need a signed-in staff member take an [`AuthUser`]
//! argument; the extractor rejects the request with 401 before the handler
//! runs when the bearer token is missing, unknown or expired.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use tokio::sync::Mutex;

use almersal_shared::{authorize, Action, Locale};
use almersal_store::users::verify_password;
use almersal_store::{Database, IssuedSession, User};

use crate::api::AppState;
use crate::error::ServerError;

/// The authenticated staff member behind a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl AuthUser {
    /// Fail with 403 unless the user's role permits `action`.
    pub fn require(&self, action: Action) -> Result<(), ServerError> {
        if authorize(self.user.role, action) {
            Ok(())
        } else {
            tracing::warn!(user = %self.user.email, ?action, "action denied");
            Err(ServerError::Forbidden(format!(
                "{} may not perform {action:?}",
                self.user.role.as_str()
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ServerError::Unauthorized)?;

        let user = {
            let db = state.db.lock().await;
            db.resolve_session(&token, Utc::now())?
        };

        match user {
            Some(user) => Ok(AuthUser { user, token }),
            None => Err(ServerError::Unauthorized),
        }
    }
}

/// Check credentials and open a session. `None` on bad credentials.
///
/// The database lock is released while bcrypt runs on the blocking pool,
/// so a sign-in never stalls other requests.
pub async fn authenticate(
    db: &Mutex<Database>,
    email: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<Option<IssuedSession>, ServerError> {
    if email.trim().is_empty() || password.is_empty() {
        return Ok(None);
    }

    let Some((user, hash)) = db.lock().await.credentials_for(email)? else {
        return Ok(None);
    };

    let password = password.to_string();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServerError::Internal(format!("password check task failed: {e}")))??;
    if !matches {
        return Ok(None);
    }

    Ok(Some(db.lock().await.create_session(&user, ttl)?))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Explicit `lang` query parameter, then `Accept-Language`, then English.
pub fn resolve_locale(lang: Option<&str>, headers: &HeaderMap) -> Locale {
    if let Some(locale) = lang.and_then(|l| l.parse().ok()) {
        return locale;
    }
    headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())
        .and_then(Locale::from_accept_language)
        .unwrap_or_default()
}
