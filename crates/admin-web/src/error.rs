//! Error types for the admin web interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use openmic::OpenMicError;
use thiserror::Error;

/// Errors that can occur in the admin web interface.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// OpenMic provider error (sync and remote-delete paths).
    #[error("OpenMic error: {0}")]
    OpenMic(#[from] OpenMicError),

    /// The sync route was hit without a configured API key.
    #[error("OpenMic API key not configured")]
    ApiKeyMissing,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match &self {
            AdminError::Database(DatabaseError::NotFound { .. }) => {
                let body = serde_json::json!({ "error": self.to_string() });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            AdminError::Database(DatabaseError::AlreadyExists { .. }) => {
                let body = serde_json::json!({ "error": self.to_string() });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AdminError::Database(err) => {
                tracing::error!("Database error: {}", err);
                let body = serde_json::json!({ "error": err.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AdminError::OpenMic(err) => {
                tracing::error!("OpenMic sync error: {}", err);
                let body = serde_json::json!({
                    "error": "Failed to sync with OpenMic",
                    "details": err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AdminError::ApiKeyMissing => {
                let body = serde_json::json!({ "error": "OpenMic API key not configured" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
