//! Backend Error Module
//!
//! Errors for the HTTP surface and server startup.
//!
//! - **`types`** - `BackendError` and its status/message mapping
//! - **`conversion`** - `IntoResponse` as a JSON `{ error, status }` body

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
