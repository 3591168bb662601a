use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeologError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Ping log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ping log serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for GeologError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GeologError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            GeologError::Io(_) | GeologError::Serialization(_) => {
                tracing::error!(error = %self, "ping log failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
