/**
 * Backend Error Types
 *
 * Errors that surface at the HTTP layer or abort startup. Per-operation
 * collaboration failures never reach this type; they are reported to the
 * client over the socket (see `collab::pipeline::CollabError`).
 *
 * # Error Categories
 *
 * - **Config** - unreadable or invalid server configuration
 * - **Store** - document store unreachable at startup or on `/health`
 * - **Io** - binding the listener
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Document store failure
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Migration failure at startup
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BackendError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::StoreError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ConfigError { .. } | Self::MigrationError(_) | Self::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to put in a response body
    ///
    /// Store and startup failures are summarized; their details go to the log.
    pub fn message(&self) -> String {
        match self {
            Self::StoreError(_) => "document store unavailable".to_string(),
            Self::ConfigError { .. } | Self::MigrationError(_) | Self::IoError(_) => {
                "internal server error".to_string()
            }
        }
    }
}
