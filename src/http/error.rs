//! Error type for request handlers and its HTTP rendering.

use std::error::Error;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::StoreError;
use crate::guard::PreconditionError;

/// Every way a request can fail, mapped 1:1 onto a status code.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed body field.
    InvalidInput(String),
    /// No coffee with the requested id.
    NotFound { id: String },
    /// Missing or malformed `If-Match` token.
    Precondition(PreconditionError),
    /// The `If-Match` token is stale.
    VersionConflict { id: u64, expected: u64, actual: u64 },
    /// Store-level failure; the only variant that leaks diagnostic text.
    Store(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "{}", msg),
            ApiError::NotFound { id } => write!(f, "No coffee found with ID {}", id),
            ApiError::Precondition(e) => write!(f, "{}", e),
            ApiError::VersionConflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "Version conflict for coffee with ID {}: version = {}, If-Match = {}",
                id, actual, expected
            ),
            ApiError::Store(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Precondition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            StoreError::NotFound { id } => ApiError::NotFound { id: id.to_string() },
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => ApiError::VersionConflict {
                id,
                expected,
                actual,
            },
            StoreError::Storage(msg) => ApiError::Store(msg),
        }
    }
}

impl From<PreconditionError> for ApiError {
    fn from(err: PreconditionError) -> Self {
        ApiError::Precondition(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Precondition(_) => StatusCode::BAD_REQUEST,
            ApiError::VersionConflict { .. } => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
