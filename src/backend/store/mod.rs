//! Document Store Module
//!
//! The collaboration layer does not own documents. It reads them and writes
//! title/body updates through the [`DocumentStore`] trait, which has two
//! adapters:
//!
//! - **`memory`** - In-process map, used when no database is configured and in tests
//! - **`postgres`** - `notes` table via sqlx
//!
//! Every call goes to the store; nothing is cached between operations so that
//! authorization always sees current sharing state.

/// In-memory adapter
pub mod memory;

/// PostgreSQL adapter
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::shared::{Document, DocumentId, SharingMetadata};

pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Failures reported by a document store
///
/// The details stay on the server; clients only ever see a generic reason.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Narrow interface onto the external document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if it does not exist
    async fn find_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;

    /// Replace title and body, bumping the last-modified timestamp
    async fn update_document(&self, id: &DocumentId, title: &str, body: &Value) -> Result<(), StoreError>;

    /// Ownership and sharing state of a document
    async fn sharing_metadata(&self, id: &DocumentId) -> Result<Option<SharingMetadata>, StoreError> {
        Ok(self.find_document(id).await?.map(|doc| doc.sharing()))
    }

    /// Cheap liveness check used by `/health`
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
