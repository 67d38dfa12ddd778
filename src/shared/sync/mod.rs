//! # Client Sync Driver
//!
//! Client-side half of the collaboration contract. The server does no
//! merging, so clients must:
//!
//! - coalesce local edits before sending them (see [`EditCoalescer`]),
//! - apply snapshots and peer updates directly to local state,
//! - give up on a document when a join is refused for lack of access or
//!   because the document does not exist, instead of retrying.
//!
//! [`SyncDriver`] is transport-agnostic: callers feed it server messages and
//! the current time, and send whatever client messages it returns.

pub mod coalescer;

pub use coalescer::EditCoalescer;

use serde_json::Value;
use std::time::Instant;

use crate::shared::config::AppConfig;
use crate::shared::error::SharedError;
use crate::shared::ids::DocumentId;
use crate::shared::message::{reasons, ClientMessage, ServerMessage};

/// Local copy of the document being edited
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContent {
    pub title: String,
    pub body: Value,
}

/// Where the driver is in its session with one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Joining { request_id: String },
    Joined,
    Leaving { request_id: String },
    /// The server refused the document; do not rejoin automatically
    Abandoned { reason: String },
}

/// What a server message meant for the local session
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Joined,
    Left,
    /// Local content was replaced by a snapshot or a peer's edit
    ContentReplaced(DocumentContent),
    PeerJoined,
    PeerLeft,
    Abandoned(String),
    Error(String),
    /// Message for another document, or an ack nobody is waiting for
    Ignored,
}

#[derive(Debug)]
pub struct SyncDriver {
    document_id: Option<DocumentId>,
    state: SessionState,
    content: Option<DocumentContent>,
    coalescer: EditCoalescer,
    next_request: u64,
}

impl SyncDriver {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            document_id: None,
            state: SessionState::Idle,
            content: None,
            coalescer: EditCoalescer::new(config.debounce),
            next_request: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn content(&self) -> Option<&DocumentContent> {
        self.content.as_ref()
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }

    fn next_request_id(&mut self) -> String {
        self.next_request += 1;
        self.next_request.to_string()
    }

    /// Start a session with a document
    ///
    /// Any spelling the server accepts is accepted here; the id is sent and
    /// compared in its canonical form. A malformed id leaves the session as
    /// it was.
    pub fn join(&mut self, document_id: &str, share_token: Option<String>) -> Result<ClientMessage, SharedError> {
        let document_id = DocumentId::parse(document_id)?;
        let request_id = self.next_request_id();
        if self.document_id != Some(document_id) {
            self.coalescer.discard();
            self.content = None;
        }
        self.document_id = Some(document_id);
        self.state = SessionState::Joining {
            request_id: request_id.clone(),
        };
        Ok(ClientMessage::Join {
            request_id: Some(request_id),
            document_id: document_id.to_string(),
            share_token,
        })
    }

    /// Record a local change; returns an edit only when one must go out now
    pub fn local_change(
        &mut self,
        title: impl Into<String>,
        body: Value,
        now: Instant,
    ) -> Option<ClientMessage> {
        if self.state != SessionState::Joined {
            return None;
        }
        let document_id = self.document_id?.to_string();
        let title = title.into();
        self.content = Some(DocumentContent {
            title: title.clone(),
            body: body.clone(),
        });
        self.coalescer
            .record(&document_id, title, body, now)
            .or_else(|| self.coalescer.poll(now))
    }

    /// Called periodically; yields the coalesced edit once it is due
    pub fn poll(&mut self, now: Instant) -> Option<ClientMessage> {
        if self.state != SessionState::Joined {
            return None;
        }
        self.coalescer.poll(now)
    }

    /// Flush any pending edit, then leave the room
    pub fn leave(&mut self) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        if self.state == SessionState::Joined {
            out.extend(self.coalescer.flush());
        } else {
            self.coalescer.discard();
        }
        let request_id = self.next_request_id();
        out.push(ClientMessage::Leave {
            request_id: Some(request_id.clone()),
            document_id: self.document_id.map(|id| id.to_string()),
        });
        self.state = SessionState::Leaving { request_id };
        out
    }

    /// Apply a message received from the server
    pub fn handle(&mut self, message: ServerMessage) -> SyncEvent {
        match message {
            ServerMessage::Ack {
                request_id,
                ok,
                reason,
            } => self.handle_ack(request_id, ok, reason),
            ServerMessage::DocumentSnapshot {
                document_id,
                title,
                body,
            }
            | ServerMessage::DocumentUpdated {
                document_id,
                title,
                body,
            } => {
                if !self.is_current(&document_id) {
                    return SyncEvent::Ignored;
                }
                let content = DocumentContent { title, body };
                self.content = Some(content.clone());
                SyncEvent::ContentReplaced(content)
            }
            ServerMessage::PeerJoined { document_id } => {
                if self.is_current(&document_id) {
                    SyncEvent::PeerJoined
                } else {
                    SyncEvent::Ignored
                }
            }
            ServerMessage::PeerLeft { document_id } => {
                if self.is_current(&document_id) {
                    SyncEvent::PeerLeft
                } else {
                    SyncEvent::Ignored
                }
            }
            ServerMessage::OperationError { message } => SyncEvent::Error(message),
        }
    }

    fn is_current(&self, document_id: &DocumentId) -> bool {
        self.document_id.as_ref() == Some(document_id)
    }

    fn handle_ack(&mut self, request_id: Option<String>, ok: bool, reason: Option<String>) -> SyncEvent {
        let answers_join = matches!(
            &self.state,
            SessionState::Joining { request_id: pending } if request_id.as_ref() == Some(pending)
        );
        let answers_leave = matches!(
            &self.state,
            SessionState::Leaving { request_id: pending } if request_id.as_ref() == Some(pending)
        );

        if answers_join {
            if ok {
                self.state = SessionState::Joined;
                return SyncEvent::Joined;
            }
            let reason = reason.unwrap_or_else(|| reasons::OPERATION_FAILED.to_string());
            if reason == reasons::ACCESS_DENIED || reason == reasons::NOT_FOUND {
                self.coalescer.discard();
                self.content = None;
                self.state = SessionState::Abandoned {
                    reason: reason.clone(),
                };
                SyncEvent::Abandoned(reason)
            } else {
                self.state = SessionState::Idle;
                SyncEvent::Error(reason)
            }
        } else if answers_leave {
            self.state = SessionState::Idle;
            self.document_id = None;
            self.content = None;
            if ok {
                SyncEvent::Left
            } else {
                SyncEvent::Error(reason.unwrap_or_else(|| reasons::NOT_IN_ROOM.to_string()))
            }
        } else {
            SyncEvent::Ignored
        }
    }
}
