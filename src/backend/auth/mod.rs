//! Authentication Module
//!
//! The collaboration layer consumes identities; it does not issue them. This
//! module holds the Identity Gate, which verifies the HS256 session tokens
//! issued elsewhere and binds the resulting user id to a connection.
//!
//! # Security
//!
//! - Malformed, expired or wrongly signed tokens yield "no identity", never
//!   a rejected handshake
//! - Tokens whose subject is not a user id are treated the same way
//! - Authorization is decided per operation by `backend::access`

/// JWT verification and identity resolution
pub mod sessions;

pub use sessions::{AuthError, Claims, IdentityGate};
