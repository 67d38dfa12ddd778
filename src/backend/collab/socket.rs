/**
 * WebSocket Connection Actor
 *
 * `GET /collab/ws` upgrades to a WebSocket and runs one actor per socket:
 *
 * - a writer task drains the connection's outbound queue into JSON text frames
 * - the reader loop decodes client frames and awaits each operation before
 *   reading the next, so one connection's operations never reorder
 *
 * Frames over `max_message_size` are refused by the transport before they
 * are buffered, which ends the connection.
 *
 * When the socket closes (cleanly or not) the connection is removed from its
 * room, which notifies the remaining peers, and the writer is stopped.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::backend::collab::connection::Connection;
use crate::backend::collab::pipeline::CollabService;
use crate::backend::middleware::ConnectionIdentity;
use crate::backend::server::state::AppState;
use crate::shared::message::reasons;
use crate::shared::{ClientMessage, ServerMessage, UserId};

/// What the reader loop should do with one inbound frame
#[derive(Debug, PartialEq)]
pub enum Frame {
    /// A well-formed client message
    Message(ClientMessage),
    /// Answer the sender with an `operation_error` and carry on
    Reject(&'static str),
    /// Control frames handled by the transport
    Skip,
    /// Peer closed the socket
    Close,
}

/// Classify an inbound WebSocket frame
pub fn decode_frame(message: Message) -> Frame {
    let text = match message {
        Message::Text(text) => text.as_str().to_owned(),
        Message::Binary(data) => match String::from_utf8(data.to_vec()) {
            Ok(text) => text,
            Err(_) => return Frame::Reject(reasons::MALFORMED_MESSAGE),
        },
        Message::Ping(_) | Message::Pong(_) => return Frame::Skip,
        Message::Close(_) => return Frame::Close,
    };

    match ClientMessage::decode(&text) {
        Ok(message) => Frame::Message(message),
        Err(e) => {
            tracing::debug!("[Collab] Undecodable frame: {}", e);
            Frame::Reject(reasons::MALFORMED_MESSAGE)
        }
    }
}

/// Upgrade handler for `GET /collab/ws`
pub async fn handle_collab_socket(
    State(state): State<AppState>,
    ConnectionIdentity(identity): ConnectionIdentity,
    ws: WebSocketUpgrade,
) -> Response {
    let collab = state.collab.clone();
    let max_message_size = state.config.max_message_size;
    ws.max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_upgrade(move |socket| run_connection(socket, collab, identity))
}

async fn run_connection(socket: WebSocket, collab: CollabService, identity: Option<UserId>) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut queue) = mpsc::unbounded_channel::<ServerMessage>();
    let connection = Connection::new(identity, outbound);
    let connection_id = connection.id();

    match identity {
        Some(user) => tracing::info!("[Collab] {} connected as {}", connection_id, user),
        None => tracing::info!("[Collab] {} connected anonymously", connection_id),
    }

    let writer = tokio::spawn(async move {
        while let Some(message) = queue.recv().await {
            let text = match message.encode() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("[Collab] Failed to encode outbound message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                tracing::debug!("[Collab] Writer for {} stopped: {}", connection_id, e);
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("[Collab] {} transport error: {}", connection_id, e);
                break;
            }
        };

        match decode_frame(frame) {
            Frame::Message(message) => collab.dispatch(&connection, message).await,
            Frame::Reject(reason) => {
                connection.send(ServerMessage::operation_error(reason));
            }
            Frame::Skip => {}
            Frame::Close => break,
        }
    }

    if let Some(document_id) = collab.disconnect(&connection).await {
        tracing::info!("[Collab] {} closed while in {}", connection_id, document_id);
    } else {
        tracing::info!("[Collab] {} closed", connection_id);
    }
    drop(connection);
    writer.abort();
}
