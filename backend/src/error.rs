//! Error types for the upload server.
//!
//! - [`StorageError`] - writing uploads to disk
//! - [`ServerError`] - request handling, mapped to JSON error responses
//!
//! Conversions are provided via `From` so `?` works across layers.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::api::types::error_response;

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors while storing an upload.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// Request handling errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// File or body above the configured limit.
    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ServerError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(e.body_text())
        } else {
            ServerError::BadRequest(format!("Multipart error: {}", e.body_text()))
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        eprintln!("❌ {}", self);
        (self.status(), Json(error_response(&self.to_string()))).into_response()
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for request handlers.
pub type ServerResult<T> = Result<T, ServerError>;
