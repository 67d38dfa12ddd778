/**
 * Collaboration Pipeline
 *
 * Coordinates the store, the access evaluator and the room registry for the
 * three client operations:
 *
 * - `join`  - validate id → fetch → authorize (identity or share code) →
 *             enter room → re-read → snapshot + ack to the caller
 * - `edit`  - validate id → fetch sharing → authorize (identity or public
 *             only) → persist → broadcast to the rest of the room
 * - `leave` - exit the current (or named) room → ack
 *
 * The join snapshot is read only after the caller is in the room, and the
 * registry holds room traffic for the caller until that snapshot is queued.
 * Any edit saved after the read therefore reaches the joiner after it.
 *
 * Join and leave report through the acknowledgment carrying the request id.
 * Edits have no acknowledgment, so their failures go back to the sender as an
 * `operation_error`. The edit path waits for the write to succeed before
 * broadcasting; a failed write is never announced to peers.
 *
 * There is no merging: concurrent edits from different connections are
 * persisted in whatever order the store applies them, and each broadcast
 * carries exactly what its sender wrote.
 */

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::access::{self, AccessGrant};
use crate::backend::collab::connection::Connection;
use crate::backend::collab::registry::{JoinOutcome, RegistryError, RoomRegistry};
use crate::backend::store::{DocumentStore, StoreError};
use crate::shared::message::reasons;
use crate::shared::{ClientMessage, Document, DocumentId, ServerMessage, SharedError};

/// Why a collaboration operation failed
#[derive(Debug, Error)]
pub enum CollabError {
    #[error("invalid document id: {0}")]
    InvalidDocumentId(#[from] SharedError),

    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("access to document {0} denied")]
    AccessDenied(DocumentId),

    #[error(transparent)]
    NotInRoom(#[from] RegistryError),

    #[error("document store failure: {0}")]
    Store(#[from] StoreError),
}

impl CollabError {
    /// Reason shown to the client; store details stay in the server log
    pub fn client_reason(&self) -> &'static str {
        match self {
            Self::InvalidDocumentId(_) => reasons::INVALID_DOCUMENT_ID,
            Self::NotFound(_) => reasons::NOT_FOUND,
            Self::AccessDenied(_) => reasons::ACCESS_DENIED,
            Self::NotInRoom(_) => reasons::NOT_IN_ROOM,
            Self::Store(_) => reasons::OPERATION_FAILED,
        }
    }
}

/// Entry point for every operation a connection can perform
#[derive(Clone)]
pub struct CollabService {
    registry: RoomRegistry,
    store: Arc<dyn DocumentStore>,
}

impl CollabService {
    pub fn new(registry: RoomRegistry, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Route a decoded client message to its operation
    pub async fn dispatch(&self, connection: &Connection, message: ClientMessage) {
        match message {
            ClientMessage::Join {
                request_id,
                document_id,
                share_token,
            } => {
                self.join(connection, request_id, &document_id, share_token.as_deref())
                    .await
            }
            ClientMessage::Edit {
                document_id,
                title,
                body,
            } => self.apply_edit(connection, &document_id, title, body).await,
            ClientMessage::Leave {
                request_id,
                document_id,
            } => self.leave(connection, request_id, document_id.as_deref()).await,
        }
    }

    /// Join a document's room, answering on the acknowledgment channel
    pub async fn join(
        &self,
        connection: &Connection,
        request_id: Option<String>,
        document_id: &str,
        share_token: Option<&str>,
    ) {
        match self.try_join(connection, document_id, share_token).await {
            Ok(document) => {
                let greeting = vec![
                    ServerMessage::DocumentSnapshot {
                        document_id: document.id,
                        title: document.title,
                        body: document.body,
                    },
                    ServerMessage::ack_ok(request_id),
                ];
                if !self.registry.admit(connection.id(), &document.id, greeting).await {
                    tracing::warn!("[Collab] {} left {} before its snapshot was queued", connection.id(), document.id);
                }
            }
            Err(e) => {
                log_failure(connection, "join", &e);
                connection.send(ServerMessage::ack_err(request_id, e.client_reason()));
            }
        }
    }

    async fn try_join(
        &self,
        connection: &Connection,
        raw_document_id: &str,
        share_token: Option<&str>,
    ) -> Result<Document, CollabError> {
        let document_id = DocumentId::parse(raw_document_id)?;
        let document = self
            .store
            .find_document(&document_id)
            .await?
            .ok_or(CollabError::NotFound(document_id))?;

        let grant = access::evaluate(&document.sharing(), connection.identity(), share_token)
            .ok_or(CollabError::AccessDenied(document_id))?;

        let outcome = self
            .registry
            .join(connection.id(), connection.outbound(), document_id)
            .await;
        if outcome == JoinOutcome::AlreadyMember {
            tracing::debug!("[Collab] {} re-joined {} ({:?})", connection.id(), document_id, grant);
        } else {
            tracing::info!("[Collab] {} joined {} via {:?}", connection.id(), document_id, grant);
        }

        // Edits saved before this read are in the snapshot; later ones are held
        match self.store.find_document(&document_id).await {
            Ok(Some(current)) => Ok(current),
            Ok(None) => {
                self.registry.disconnect(connection.id()).await;
                Err(CollabError::NotFound(document_id))
            }
            Err(e) => {
                self.registry.disconnect(connection.id()).await;
                Err(e.into())
            }
        }
    }

    /// Authorize, persist and broadcast an edit
    pub async fn apply_edit(&self, connection: &Connection, document_id: &str, title: String, body: Value) {
        match self.try_apply_edit(connection, document_id, title, body).await {
            Ok(recipients) => {
                tracing::debug!("[Collab] Edit from {} delivered to {} peers", connection.id(), recipients);
            }
            Err(e) => {
                log_failure(connection, "edit", &e);
                connection.send(ServerMessage::operation_error(e.client_reason()));
            }
        }
    }

    async fn try_apply_edit(
        &self,
        connection: &Connection,
        raw_document_id: &str,
        title: String,
        body: Value,
    ) -> Result<usize, CollabError> {
        let document_id = DocumentId::parse(raw_document_id)?;
        let sharing = self
            .store
            .sharing_metadata(&document_id)
            .await?
            .ok_or(CollabError::NotFound(document_id))?;

        // Share codes are only honoured on join
        let grant: AccessGrant = access::evaluate(&sharing, connection.identity(), None)
            .ok_or(CollabError::AccessDenied(document_id))?;

        self.store.update_document(&document_id, &title, &body).await?;
        tracing::debug!("[Collab] {} saved {} via {:?}", connection.id(), document_id, grant);

        let update = ServerMessage::DocumentUpdated {
            document_id,
            title,
            body,
        };
        Ok(self
            .registry
            .broadcast(&document_id, update, Some(connection.id()))
            .await)
    }

    /// Leave the current room, or the named one
    pub async fn leave(&self, connection: &Connection, request_id: Option<String>, document_id: Option<&str>) {
        match self.try_leave(connection, document_id).await {
            Ok(left) => {
                tracing::info!("[Collab] {} left {}", connection.id(), left);
                connection.send(ServerMessage::ack_ok(request_id));
            }
            Err(e) => {
                log_failure(connection, "leave", &e);
                connection.send(ServerMessage::ack_err(request_id, e.client_reason()));
            }
        }
    }

    async fn try_leave(&self, connection: &Connection, raw_document_id: Option<&str>) -> Result<DocumentId, CollabError> {
        let document_id = raw_document_id.map(DocumentId::parse).transpose()?;
        Ok(self.registry.leave(connection.id(), document_id).await?)
    }

    /// Transport closed; leave silently from the caller's point of view
    pub async fn disconnect(&self, connection: &Connection) -> Option<DocumentId> {
        self.registry.disconnect(connection.id()).await
    }
}

fn log_failure(connection: &Connection, operation: &str, error: &CollabError) {
    match error {
        CollabError::Store(e) => {
            tracing::error!("[Collab] {} from {} failed in store: {}", operation, connection.id(), e)
        }
        other => tracing::info!("[Collab] {} from {} rejected: {}", operation, connection.id(), other),
    }
}
