//! Middleware Module
//!
//! Request-processing pieces that sit in front of handlers.
//!
//! - **`auth`** - Optional identity extraction for collaboration sockets

pub mod auth;

pub use auth::{extract_bearer_token, ConnectionIdentity};
