//! Live WebSocket connections against a server on an ephemeral port

use crate::common::*;
use collabnotes::backend::auth::IdentityGate;
use collabnotes::backend::server::config::DEV_JWT_SECRET;
use collabnotes::backend::server::{build_app, ServerConfig};
use collabnotes::backend::store::InMemoryDocumentStore;
use collabnotes::shared::message::reasons;
use collabnotes::shared::{ClientMessage, Document, DocumentId, ServerMessage, UserId};
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

struct LiveServer {
    addr: SocketAddr,
    store: InMemoryDocumentStore,
    gate: IdentityGate,
    task: JoinHandle<()>,
}

impl LiveServer {
    async fn start(max_message_size: usize) -> Self {
        let store = InMemoryDocumentStore::new();
        let config = ServerConfig {
            max_message_size,
            ..ServerConfig::default()
        };
        let app = build_app(config, Arc::new(store.clone()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            store,
            gate: IdentityGate::new(DEV_JWT_SECRET),
            task,
        }
    }

    async fn seed(&self, document: Document) -> Document {
        self.store.insert(document.clone()).await;
        document
    }

    async fn connect(&self, identity: Option<UserId>) -> Client {
        let url = match identity {
            Some(user) => format!(
                "ws://{}/collab/ws?token={}",
                self.addr,
                self.gate.create_token(user).unwrap()
            ),
            None => format!("ws://{}/collab/ws", self.addr),
        };
        let (client, _response) = connect_async(url).await.unwrap();
        client
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn send(client: &mut Client, message: ClientMessage) {
    client.send(Message::text(message.encode().unwrap())).await.unwrap();
}

/// Next server message, skipping control frames
async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("transport error");
        if frame.is_text() {
            return ServerMessage::decode(frame.to_text().unwrap()).unwrap();
        }
    }
}

async fn assert_quiet(client: &mut Client) {
    if let Ok(Some(Ok(frame))) = timeout(QUIET, client.next()).await {
        panic!("unexpected frame: {:?}", frame);
    }
}

/// Wait until the server ends the connection
async fn assert_closed(client: &mut Client) {
    loop {
        match timeout(WAIT, client.next()).await.expect("connection stayed open") {
            None | Some(Err(_)) => return,
            Some(Ok(Message::Close(_))) => return,
            Some(Ok(_)) => {}
        }
    }
}

fn join(request_id: &str, document_id: &DocumentId) -> ClientMessage {
    ClientMessage::Join {
        request_id: Some(request_id.to_string()),
        document_id: document_id.to_string(),
        share_token: None,
    }
}

/// Join and consume the snapshot and ack
async fn join_room(client: &mut Client, document: &Document) {
    send(client, join("j", &document.id)).await;
    assert_eq!(
        recv(client).await,
        ServerMessage::DocumentSnapshot {
            document_id: document.id,
            title: document.title.clone(),
            body: document.body.clone(),
        }
    );
    assert_eq!(recv(client).await, ServerMessage::ack_ok(Some("j".to_string())));
}

#[tokio::test]
async fn test_dropped_socket_announces_peer_left_once() {
    let server = LiveServer::start(ServerConfig::default().max_message_size).await;
    let owner = user();
    let doc = server.seed(private_note(owner)).await;
    let mut stays = server.connect(Some(owner)).await;
    let mut goes = server.connect(Some(owner)).await;

    join_room(&mut stays, &doc).await;
    join_room(&mut goes, &doc).await;
    assert_eq!(recv(&mut stays).await, ServerMessage::PeerJoined { document_id: doc.id });

    drop(goes);

    assert_eq!(recv(&mut stays).await, ServerMessage::PeerLeft { document_id: doc.id });
    assert_quiet(&mut stays).await;
}

#[tokio::test]
async fn test_closed_socket_announces_peer_left_once() {
    let server = LiveServer::start(ServerConfig::default().max_message_size).await;
    let owner = user();
    let doc = server.seed(private_note(owner)).await;
    let mut stays = server.connect(Some(owner)).await;
    let mut goes = server.connect(Some(owner)).await;

    join_room(&mut stays, &doc).await;
    join_room(&mut goes, &doc).await;
    recv(&mut stays).await;

    goes.close(None).await.unwrap();

    assert_eq!(recv(&mut stays).await, ServerMessage::PeerLeft { document_id: doc.id });
    assert_quiet(&mut stays).await;
}

#[tokio::test]
async fn test_edit_over_socket_reaches_peer_only() {
    let server = LiveServer::start(ServerConfig::default().max_message_size).await;
    let owner = user();
    let doc = server.seed(private_note(owner)).await;
    let mut a = server.connect(Some(owner)).await;
    let mut b = server.connect(Some(owner)).await;
    join_room(&mut a, &doc).await;
    join_room(&mut b, &doc).await;
    recv(&mut a).await;

    send(
        &mut a,
        ClientMessage::Edit {
            document_id: doc.id.to_string(),
            title: "T2".to_string(),
            body: json!("<p>x</p>"),
        },
    )
    .await;

    assert_eq!(recv(&mut b).await, updated(doc.id, "T2", json!("<p>x</p>")));
    assert_quiet(&mut a).await;
    assert_eq!(server.store.get(&doc.id).await.unwrap().title, "T2");
}

#[tokio::test]
async fn test_malformed_frames_answered_and_connection_kept() {
    let server = LiveServer::start(ServerConfig::default().max_message_size).await;
    let owner = user();
    let doc = server.seed(private_note(owner)).await;
    let mut client = server.connect(Some(owner)).await;

    client.send(Message::text("not json")).await.unwrap();
    assert_eq!(recv(&mut client).await, ServerMessage::operation_error(reasons::MALFORMED_MESSAGE));

    client.send(Message::binary(vec![0xff, 0xfe])).await.unwrap();
    assert_eq!(recv(&mut client).await, ServerMessage::operation_error(reasons::MALFORMED_MESSAGE));

    join_room(&mut client, &doc).await;
}

#[tokio::test]
async fn test_handshake_without_token_is_anonymous() {
    let server = LiveServer::start(ServerConfig::default().max_message_size).await;
    let private = server.seed(private_note(user())).await;
    let public = server.seed(private_note(user()).public(true)).await;
    let mut client = server.connect(None).await;

    send(&mut client, join("p", &private.id)).await;
    assert_eq!(
        recv(&mut client).await,
        ServerMessage::ack_err(Some("p".to_string()), reasons::ACCESS_DENIED)
    );

    join_room(&mut client, &public).await;
}

#[tokio::test]
async fn test_oversized_frame_refused_at_transport() {
    let server = LiveServer::start(256).await;
    let owner = user();
    let doc = server.seed(private_note(owner)).await;
    let mut stays = server.connect(Some(owner)).await;
    let mut sender = server.connect(Some(owner)).await;
    join_room(&mut stays, &doc).await;
    join_room(&mut sender, &doc).await;
    recv(&mut stays).await;

    let edit = ClientMessage::Edit {
        document_id: doc.id.to_string(),
        title: "a".repeat(1024),
        body: json!(null),
    };
    // The server may already be gone by the time the send completes
    let _ = sender.send(Message::text(edit.encode().unwrap())).await;

    assert_closed(&mut sender).await;
    assert_eq!(recv(&mut stays).await, ServerMessage::PeerLeft { document_id: doc.id });
    assert_eq!(server.store.get(&doc.id).await.unwrap().title, "T1");
}
