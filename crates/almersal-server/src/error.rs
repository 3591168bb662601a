use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use almersal_shared::ValidationError;
use almersal_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Remittance not found: {0}")]
    RemittanceNotFound(i64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests, try again later")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound("Record not found".into()),
            StoreError::Validation(e) => ServerError::Validation(e),
            StoreError::DuplicateEmail(email) => {
                ServerError::BadRequest(format!("Email already registered: {email}"))
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::RemittanceNotFound(_) | ServerError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ServerError::BadRequest(_) | ServerError::Validation(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
