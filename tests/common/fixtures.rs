//! Server and client fixtures
//!
//! Builds a `CollabService` over the in-memory store and hands out
//! channel-backed connections, so tests see exactly what a socket writer
//! would send without opening sockets.

use collabnotes::backend::collab::{CollabService, Connection, RoomRegistry};
use collabnotes::backend::store::InMemoryDocumentStore;
use collabnotes::shared::{ClientMessage, Document, DocumentId, ServerMessage, UserId};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use uuid::Uuid;

pub struct TestServer {
    pub service: CollabService,
    pub store: InMemoryDocumentStore,
}

impl TestServer {
    pub fn new() -> Self {
        let store = InMemoryDocumentStore::new();
        let service = CollabService::new(RoomRegistry::new(), Arc::new(store.clone()));
        Self { service, store }
    }

    pub fn connect(&self, identity: Option<UserId>) -> TestClient {
        let (tx, rx) = mpsc::unbounded_channel();
        TestClient {
            connection: Connection::new(identity, tx),
            inbox: rx,
        }
    }

    pub async fn seed(&self, document: Document) -> Document {
        self.store.insert(document.clone()).await;
        document
    }

    /// Current stored title and body
    pub async fn stored(&self, id: &DocumentId) -> (String, serde_json::Value) {
        let doc = self.store.get(id).await.expect("document should exist");
        (doc.title, doc.body)
    }

    pub async fn send(&self, client: &TestClient, message: ClientMessage) {
        self.service.dispatch(&client.connection, message).await;
    }

    /// Join and throw away the snapshot and ack
    pub async fn join(&self, client: &mut TestClient, document_id: &DocumentId) {
        self.service
            .join(&client.connection, None, &document_id.to_string(), None)
            .await;
        client.drain();
    }

    pub async fn edit(&self, client: &TestClient, document_id: &DocumentId, title: &str, body: serde_json::Value) {
        self.service
            .apply_edit(&client.connection, &document_id.to_string(), title.to_string(), body)
            .await;
    }
}

pub struct TestClient {
    pub connection: Connection,
    pub inbox: UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    /// Everything queued for this client so far
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(message) = self.inbox.try_recv() {
            out.push(message);
        }
        out
    }
}

pub fn user() -> UserId {
    UserId::new(Uuid::new_v4())
}

pub fn document_id() -> DocumentId {
    DocumentId::new(Uuid::new_v4())
}

/// Private note with no sharing
pub fn private_note(owner: UserId) -> Document {
    Document::new(document_id(), owner, "T1").with_body(json!({ "type": "doc", "content": [] }))
}

pub fn updated(document_id: DocumentId, title: &str, body: serde_json::Value) -> ServerMessage {
    ServerMessage::DocumentUpdated {
        document_id,
        title: title.to_string(),
        body,
    }
}
