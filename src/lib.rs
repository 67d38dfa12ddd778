//! CollabNotes - Real-Time Note Collaboration
//!
//! Several clients open the same rich-text note and see each other's edits
//! live. Each edit is authorized against the note's sharing settings,
//! persisted, and then relayed to everyone else viewing the note.
//!
//! # Module Structure
//!
//! - **`shared`** - Types used on both sides of the socket
//!   - Identifiers, documents, wire messages
//!   - Client sync driver with edit coalescing
//!   - Client configuration and shared error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum WebSocket server, Identity Gate, Access Control Evaluator
//!   - Room registry and edit propagation pipeline
//!   - Document store adapters (in-memory, PostgreSQL)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend and its server dependencies
//!
//! # Consistency Model
//!
//! There is no merging. The store keeps whichever write it applied last, and
//! clients replace their local content wholesale on every inbound update.
//! Concurrent edits to the same note can therefore overwrite each other.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
