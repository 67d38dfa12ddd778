/**
 * Collaboration Wire Messages
 *
 * Every frame on the collaboration socket is a JSON object tagged by `type`.
 * Clients send `join`, `edit` and `leave`; the server answers with
 * acknowledgments (correlated by `request_id`), a snapshot for the joiner,
 * room notices and update broadcasts.
 *
 * Document ids arrive from clients as raw strings so that a malformed id can
 * be reported as such instead of failing the whole frame.
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::SharedError;
use crate::shared::ids::DocumentId;

/// Fixed acknowledgment and error reasons sent to clients
///
/// Store and token details never reach the wire; these are the only strings
/// a client will see.
pub mod reasons {
    pub const INVALID_DOCUMENT_ID: &str = "invalid document id";
    pub const NOT_FOUND: &str = "document not found";
    pub const ACCESS_DENIED: &str = "access denied";
    pub const NOT_IN_ROOM: &str = "not in room";
    pub const OPERATION_FAILED: &str = "operation failed";
    pub const MALFORMED_MESSAGE: &str = "malformed message";
}

/// Messages sent from a client to the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the room of a document
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        document_id: String,
        /// Share code granting access without an identity
        #[serde(default, skip_serializing_if = "Option::is_none")]
        share_token: Option<String>,
    },
    /// Replace the title and body of a document. Never acknowledged.
    Edit {
        document_id: String,
        title: String,
        body: Value,
    },
    /// Leave the current room, or a specific one
    Leave {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_id: Option<String>,
    },
}

/// Messages sent from the server to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to a `join` or `leave`
    Ack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Full document state, sent only to the connection that joined
    DocumentSnapshot {
        document_id: DocumentId,
        title: String,
        body: Value,
    },
    PeerJoined {
        document_id: DocumentId,
    },
    PeerLeft {
        document_id: DocumentId,
    },
    /// An edit made by another member of the room
    DocumentUpdated {
        document_id: DocumentId,
        title: String,
        body: Value,
    },
    /// Failure of an unacknowledged operation, addressed to its sender only
    OperationError {
        message: String,
    },
}

impl ClientMessage {
    /// Decode a client frame
    pub fn decode(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode a client frame
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerMessage {
    pub fn ack_ok(request_id: Option<String>) -> Self {
        Self::Ack {
            request_id,
            ok: true,
            reason: None,
        }
    }

    pub fn ack_err(request_id: Option<String>, reason: impl Into<String>) -> Self {
        Self::Ack {
            request_id,
            ok: false,
            reason: Some(reason.into()),
        }
    }

    pub fn operation_error(message: impl Into<String>) -> Self {
        Self::OperationError {
            message: message.into(),
        }
    }

    /// Decode a server frame
    pub fn decode(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode a server frame
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
