/**
 * Canonical Identifiers
 *
 * Users, documents and connections are each identified by a UUID newtype.
 * Equality is defined once, on the wrapped `Uuid`, so an owner id read from
 * the store and a user id read from a token compare as values regardless of
 * how either was originally spelled (case, surrounding whitespace, braces).
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Identity of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

/// Identifier of a shared document (a note)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

/// Identifier of one live transport session
///
/// Minted on handshake and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

fn parse_uuid(field: &'static str, raw: &str) -> Result<Uuid, SharedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SharedError::validation(field, "identifier is empty"));
    }
    Uuid::parse_str(trimmed)
        .map_err(|e| SharedError::validation(field, format!("malformed identifier: {}", e)))
}

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a user id from its textual form
    pub fn parse(raw: &str) -> Result<Self, SharedError> {
        parse_uuid("user_id", raw).map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl DocumentId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a document id, rejecting anything that is not well-formed
    ///
    /// This is the only shape check performed on client-supplied ids; it runs
    /// before any store access.
    pub fn parse(raw: &str) -> Result<Self, SharedError> {
        parse_uuid("document_id", raw).map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
