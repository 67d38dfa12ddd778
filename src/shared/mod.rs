//! Shared Module
//!
//! Types shared between the collaboration server and its clients: canonical
//! identifiers, the document model, the socket wire protocol and the
//! client-side sync driver. Nothing in here depends on the `ssr` feature.

/// Canonical identifier types
pub mod ids;

/// Document and sharing metadata
pub mod document;

/// Collaboration socket messages
pub mod message;

/// Shared error types
pub mod error;

/// Client configuration
pub mod config;

/// Client-side edit coalescing and session handling
pub mod sync;

/// Re-export commonly used types for convenience
pub use ids::{ConnectionId, DocumentId, UserId};
pub use document::{Document, SharingMetadata};
pub use message::{ClientMessage, ServerMessage};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use sync::{EditCoalescer, SyncDriver, SyncEvent};
