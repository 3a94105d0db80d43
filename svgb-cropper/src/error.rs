//! Error types for svgb-cropper
//!
//! `Error` is the core taxonomy returned by the scanner, asset store and
//! session. `ApiError` is the transport-facing wrapper rendered as JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Input directory could not be listed
    #[error("Cannot list directory {path}: {reason}")]
    DirectoryAccess { path: PathBuf, reason: String },

    /// Asset missing, unreadable, or read timed out
    #[error("Cannot read asset {name}: {reason}")]
    AssetRead { name: String, reason: String },

    /// Processed asset could not be persisted
    #[error("Cannot write asset {name}: {reason}")]
    AssetWrite { name: String, reason: String },

    /// Invalid or colliding startup configuration
    #[error(transparent)]
    Configuration(#[from] svgb_common::Error),

    /// Operation not allowed in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Convenience Result type using svgb-cropper Error
pub type Result<T> = std::result::Result<T, Error>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed step payload (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failure reported by the session (status depends on the variant)
    #[error(transparent)]
    Session(#[from] Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Session(Error::InvalidState(_)) => (StatusCode::CONFLICT, "INVALID_STATE"),
            ApiError::Session(Error::DirectoryAccess { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DIRECTORY_ACCESS_ERROR")
            }
            ApiError::Session(Error::AssetRead { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ASSET_READ_ERROR")
            }
            ApiError::Session(Error::AssetWrite { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ASSET_WRITE_ERROR")
            }
            ApiError::Session(Error::Configuration(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
