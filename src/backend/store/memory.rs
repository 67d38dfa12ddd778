/**
 * In-Memory Document Store
 *
 * Keeps documents in a `HashMap` behind a tokio `RwLock`. Used when the server
 * runs without `DATABASE_URL`, and by tests, which can also make writes fail,
 * slow reads or writes down, and count reads to exercise the error and
 * concurrency paths.
 */

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::backend::store::{DocumentStore, StoreError};
use crate::shared::{Document, DocumentId};

#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentId, Document>>>,
    fail_writes: Arc<AtomicBool>,
    write_delay_ms: Arc<AtomicU64>,
    read_delay_ms: Arc<AtomicU64>,
    reads: Arc<AtomicU64>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document
    pub async fn insert(&self, document: Document) {
        self.documents.write().await.insert(document.id, document);
    }

    /// Current stored state of a document
    pub async fn get(&self, id: &DocumentId) -> Option<Document> {
        self.documents.read().await.get(id).cloned()
    }

    /// Make every subsequent write fail with `StoreError::Unavailable`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent write, simulating a slow backend
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Hold every subsequent read for `delay` after the data was taken
    pub fn set_read_delay(&self, delay: Duration) {
        self.read_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `find_document` calls served so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let document = self.documents.read().await.get(id).cloned();

        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(document)
    }

    async fn update_document(&self, id: &DocumentId, title: &str, body: &Value) -> Result<(), StoreError> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }

        let mut documents = self.documents.write().await;
        let document = documents.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        document.title = title.to_string();
        document.body = body.clone();
        document.updated_at = Utc::now();
        Ok(())
    }
}
