//! Per-connection handle passed to every collaboration operation.

use crate::backend::collab::registry::Outbound;
use crate::shared::{ConnectionId, ServerMessage, UserId};

/// One live socket session
///
/// The identity is fixed at handshake and never changes. Messages addressed
/// to this connection alone (acks, snapshots, operation errors) go straight
/// onto its outbound queue.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    identity: Option<UserId>,
    outbound: Outbound,
}

impl Connection {
    pub fn new(identity: Option<UserId>, outbound: Outbound) -> Self {
        Self {
            id: ConnectionId::new(),
            identity,
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> Option<&UserId> {
        self.identity.as_ref()
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Queue a message for this connection only; false once the socket is gone
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }
}
