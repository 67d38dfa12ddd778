/**
 * Room Registry
 *
 * Tracks which connections are in which document's room. A connection is in
 * at most one room at a time. Rooms exist only while they have members.
 *
 * All membership changes and broadcasts go through a single `RwLock`, so a
 * connection moving between rooms is removed from the old room, announced
 * there, and added to the new one without any other operation observing the
 * intermediate state.
 *
 * Messages are delivered by pushing onto each member's outbound channel; the
 * per-connection writer task owns the actual socket.
 *
 * A joining member is held until `admit` queues its snapshot. Room traffic
 * addressed to it in the meantime is buffered and released after the
 * snapshot, so the joiner never sees an update followed by older content.
 */

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

use crate::shared::{ConnectionId, DocumentId, ServerMessage};

/// Outbound queue of one connection
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Added to the room, after leaving `previous` if it was elsewhere
    Joined { previous: Option<DocumentId> },
    /// Already in this room; nothing changed
    AlreadyMember,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The connection is not in the requested room (or in no room at all)
    #[error("connection {connection} is not in the requested room")]
    NotInRoom {
        connection: ConnectionId,
        requested: Option<DocumentId>,
    },
}

#[derive(Debug)]
struct Member {
    outbound: Outbound,
    /// `Some` until the member's snapshot has been queued
    held: Option<Vec<ServerMessage>>,
}

impl Member {
    fn joining(outbound: Outbound) -> Self {
        Self {
            outbound,
            held: Some(Vec::new()),
        }
    }

    fn deliver(&mut self, message: ServerMessage) -> bool {
        match &mut self.held {
            Some(held) => {
                held.push(message);
                true
            }
            None => self.outbound.send(message).is_ok(),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    rooms: HashMap<DocumentId, HashMap<ConnectionId, Member>>,
    membership: HashMap<ConnectionId, DocumentId>,
}

impl RegistryInner {
    fn send_room(&mut self, document_id: &DocumentId, message: &ServerMessage, exclude: Option<ConnectionId>) -> usize {
        let Some(members) = self.rooms.get_mut(document_id) else {
            return 0;
        };
        let mut delivered = 0;
        for (id, member) in members.iter_mut() {
            if Some(*id) == exclude {
                continue;
            }
            if member.deliver(message.clone()) {
                delivered += 1;
            } else {
                tracing::trace!("[Registry] Outbound queue of {} already closed", id);
            }
        }
        delivered
    }

    /// Remove a connection from a room and tell whoever is left
    fn remove_member(&mut self, connection: ConnectionId, document_id: DocumentId) {
        self.membership.remove(&connection);
        let now_empty = match self.rooms.get_mut(&document_id) {
            Some(members) => {
                members.remove(&connection);
                members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.rooms.remove(&document_id);
            tracing::debug!("[Registry] Room {} closed", document_id);
        } else {
            self.send_room(&document_id, &ServerMessage::PeerLeft { document_id }, None);
        }
    }
}

/// Registry of live rooms, shared by every connection handler
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a connection in a document's room
    ///
    /// Leaving a previous room announces `peer_left` there exactly once;
    /// entering announces `peer_joined` to the other members. Joining the
    /// room the connection is already in changes no membership.
    ///
    /// Either way the member is held: nothing reaches its outbound queue
    /// until [`RoomRegistry::admit`] is called.
    pub async fn join(&self, connection: ConnectionId, outbound: &Outbound, document_id: DocumentId) -> JoinOutcome {
        let mut inner = self.inner.write().await;

        let previous = inner.membership.get(&connection).copied();
        if previous == Some(document_id) {
            if let Some(member) = inner
                .rooms
                .get_mut(&document_id)
                .and_then(|members| members.get_mut(&connection))
            {
                member.held.get_or_insert_with(Vec::new);
            }
            return JoinOutcome::AlreadyMember;
        }
        if let Some(previous) = previous {
            inner.remove_member(connection, previous);
        }

        inner
            .rooms
            .entry(document_id)
            .or_default()
            .insert(connection, Member::joining(outbound.clone()));
        inner.membership.insert(connection, document_id);
        let notified = inner.send_room(&document_id, &ServerMessage::PeerJoined { document_id }, Some(connection));

        tracing::info!(
            "[Registry] {} joined {} ({} peers notified, previous room: {:?})",
            connection,
            document_id,
            notified,
            previous
        );
        JoinOutcome::Joined { previous }
    }

    /// Queue `greeting` for a held member, then release what was buffered
    ///
    /// Returns `false` if the connection is no longer in that room.
    pub async fn admit(&self, connection: ConnectionId, document_id: &DocumentId, greeting: Vec<ServerMessage>) -> bool {
        let mut inner = self.inner.write().await;
        let Some(member) = inner
            .rooms
            .get_mut(document_id)
            .and_then(|members| members.get_mut(&connection))
        else {
            return false;
        };

        let held = member.held.take().unwrap_or_default();
        let released = held.len();
        for message in greeting.into_iter().chain(held) {
            if member.outbound.send(message).is_err() {
                tracing::trace!("[Registry] Outbound queue of {} already closed", connection);
                break;
            }
        }
        if released > 0 {
            tracing::debug!("[Registry] Released {} held messages to {}", released, connection);
        }
        true
    }

    /// Take a connection out of its room
    ///
    /// With `Some(document_id)` the connection must be in exactly that room;
    /// with `None` it leaves whichever room it is in.
    pub async fn leave(
        &self,
        connection: ConnectionId,
        document_id: Option<DocumentId>,
    ) -> Result<DocumentId, RegistryError> {
        let mut inner = self.inner.write().await;
        let current = inner.membership.get(&connection).copied();
        match (current, document_id) {
            (Some(current), None) => {
                inner.remove_member(connection, current);
                tracing::info!("[Registry] {} left {}", connection, current);
                Ok(current)
            }
            (Some(current), Some(requested)) if current == requested => {
                inner.remove_member(connection, current);
                tracing::info!("[Registry] {} left {}", connection, current);
                Ok(current)
            }
            _ => Err(RegistryError::NotInRoom {
                connection,
                requested: document_id,
            }),
        }
    }

    /// Implicit leave on transport termination; nothing to acknowledge
    pub async fn disconnect(&self, connection: ConnectionId) -> Option<DocumentId> {
        let mut inner = self.inner.write().await;
        let current = inner.membership.get(&connection).copied()?;
        inner.remove_member(connection, current);
        tracing::info!("[Registry] {} disconnected from {}", connection, current);
        Some(current)
    }

    /// Deliver a message to every member of a room except `exclude`
    ///
    /// Returns the number of members the message was queued for.
    pub async fn broadcast(
        &self,
        document_id: &DocumentId,
        message: ServerMessage,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let mut inner = self.inner.write().await;
        inner.send_room(document_id, &message, exclude)
    }

    pub async fn current_room(&self, connection: ConnectionId) -> Option<DocumentId> {
        self.inner.read().await.membership.get(&connection).copied()
    }

    pub async fn member_count(&self, document_id: &DocumentId) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(document_id)
            .map_or(0, HashMap::len)
    }

    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }
}
