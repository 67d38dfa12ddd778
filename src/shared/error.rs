//! Shared Error Types
//!
//! Error types used by both the server and the client-side sync driver.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON encoding/decoding of wire messages
//! - `ValidationError` - Malformed identifiers or field values
//!
//! # Usage
//!
//! ```rust
//! use collabnotes::shared::error::SharedError;
//!
//! let error = SharedError::validation("document_id", "identifier is empty");
//! assert!(error.to_string().contains("document_id"));
//! ```
use thiserror::Error;

/// Shared error types that can occur on either side of the connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
