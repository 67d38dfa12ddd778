/**
 * Document Model
 *
 * A document is a note owned by one user, optionally public, optionally
 * reachable through a share code, and optionally shared with a set of users.
 * The collaboration layer only reads these records; it never caches them
 * between operations.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::ids::{DocumentId, UserId};

/// A shared note as stored by the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub owner_id: UserId,
    pub title: String,
    /// Serialized rich-text content; never interpreted by the server
    pub body: Value,
    pub is_public: bool,
    /// Share code granting access without an identity
    pub share_token: Option<String>,
    /// Users explicitly granted access
    pub shared_with: Vec<UserId>,
    pub updated_at: DateTime<Utc>,
}

/// The parts of a document that decide who may access it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingMetadata {
    pub owner_id: UserId,
    pub is_public: bool,
    pub share_token: Option<String>,
    pub shared_with: Vec<UserId>,
}

impl Document {
    /// A new private, unshared document with an empty body
    pub fn new(id: DocumentId, owner_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            body: Value::Null,
            is_public: false,
            share_token: None,
            shared_with: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_share_token(mut self, token: impl Into<String>) -> Self {
        self.share_token = Some(token.into());
        self
    }

    pub fn shared_with(mut self, user: UserId) -> Self {
        if !self.shared_with.contains(&user) {
            self.shared_with.push(user);
        }
        self
    }

    pub fn sharing(&self) -> SharingMetadata {
        SharingMetadata {
            owner_id: self.owner_id,
            is_public: self.is_public,
            share_token: self.share_token.clone(),
            shared_with: self.shared_with.clone(),
        }
    }
}
