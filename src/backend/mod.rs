//! Backend Module
//!
//! Server-side code: an Axum server that lets several clients edit the same
//! rich-text note at once over WebSockets. Only compiled with the `ssr`
//! feature.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - Router assembly (`/collab/ws`, `/health`)
//! - **`auth`** - Identity Gate (bearer token → user id)
//! - **`middleware`** - Handshake identity extraction
//! - **`access`** - Access Control Evaluator (pure)
//! - **`store`** - Document store trait with in-memory and Postgres adapters
//! - **`collab`** - Room registry, edit pipeline, socket actor
//! - **`error`** - Backend error types
//!
//! # Request Flow
//!
//! ```text
//! GET /collab/ws ──► ConnectionIdentity (auth) ──► socket actor
//!                                                    │
//!        join / edit / leave ◄───────────────────────┘
//!              │
//!              ▼
//!        CollabService ──► store (fetch, persist)
//!              │        ──► access::evaluate
//!              ▼
//!        RoomRegistry ──► peers' outbound queues
//! ```
//!
//! # Thread Safety
//!
//! Room membership lives behind a single `tokio::sync::RwLock`; each
//! connection has its own unbounded outbound queue drained by a writer task.
//! Operations from one connection are processed in arrival order, operations
//! from different connections interleave freely.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Identity Gate
pub mod auth;

/// Handshake identity extraction
pub mod middleware;

/// Access Control Evaluator
pub mod access;

/// Document store seam
pub mod store;

/// Real-time collaboration
pub mod collab;

pub use collab::{CollabService, RoomRegistry};
pub use error::BackendError;
pub use server::create_app;
