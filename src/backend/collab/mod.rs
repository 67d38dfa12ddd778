//! Collaboration Module
//!
//! Server side of real-time document collaboration over WebSockets.
//!
//! # Architecture
//!
//! - **`registry`** - Which connections are in which document's room
//! - **`connection`** - Per-socket handle (id, identity, outbound queue)
//! - **`pipeline`** - Join, leave and edit coordination (`CollabService`)
//! - **`socket`** - Axum upgrade handler and per-connection actor
//!
//! Documents have no in-memory state here. Every operation reads and writes
//! through the document store, and rooms are only routing tables for
//! broadcasts.

pub mod connection;
pub mod pipeline;
pub mod registry;
pub mod socket;

pub use connection::Connection;
pub use pipeline::{CollabError, CollabService};
pub use registry::{JoinOutcome, Outbound, RegistryError, RoomRegistry};
pub use socket::handle_collab_socket;
