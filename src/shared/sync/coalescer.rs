//! # Edit Coalescer
//!
//! Buffers rapid local edits and releases at most one `edit` per flush
//! interval. Only the newest content is kept: intermediate keystrokes are
//! superseded, never queued.
//!
//! The interval is measured from the first change that has not been flushed
//! yet, so a user typing continuously still sees their edits go out every
//! window instead of only when they pause.

use serde_json::Value;
use std::time::{Duration, Instant};

use crate::shared::message::ClientMessage;

#[derive(Debug, Clone)]
struct PendingEdit {
    document_id: String,
    title: String,
    body: Value,
    first_change: Instant,
}

impl PendingEdit {
    fn into_message(self) -> ClientMessage {
        ClientMessage::Edit {
            document_id: self.document_id,
            title: self.title,
            body: self.body,
        }
    }
}

/// Coalescing buffer with a fixed flush interval
#[derive(Debug, Clone)]
pub struct EditCoalescer {
    window: Duration,
    pending: Option<PendingEdit>,
}

impl EditCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the latest local content for a document
    ///
    /// If content for a *different* document was still pending it is returned
    /// for immediate sending rather than being lost.
    pub fn record(
        &mut self,
        document_id: &str,
        title: impl Into<String>,
        body: Value,
        now: Instant,
    ) -> Option<ClientMessage> {
        let title = title.into();
        match self.pending.as_mut() {
            Some(pending) if pending.document_id == document_id => {
                pending.title = title;
                pending.body = body;
                None
            }
            _ => {
                let displaced = self.pending.replace(PendingEdit {
                    document_id: document_id.to_string(),
                    title,
                    body,
                    first_change: now,
                });
                displaced.map(PendingEdit::into_message)
            }
        }
    }

    /// Release the pending edit if its window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<ClientMessage> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.first_change) >= self.window);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// Release the pending edit regardless of the window
    pub fn flush(&mut self) -> Option<ClientMessage> {
        self.pending.take().map(PendingEdit::into_message)
    }

    /// Drop pending content without sending it
    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Time left before the pending edit becomes due
    pub fn time_until_flush(&self, now: Instant) -> Option<Duration> {
        let pending = self.pending.as_ref()?;
        let elapsed = now.saturating_duration_since(pending.first_change);
        Some(self.window.saturating_sub(elapsed))
    }
}
