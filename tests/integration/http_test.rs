//! HTTP surface: health check, fallback, socket route

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use collabnotes::backend::server::{build_app, create_app, ServerConfig};
use collabnotes::backend::store::{DocumentStore, InMemoryDocumentStore, StoreError};
use collabnotes::shared::{Document, DocumentId};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Store whose backend is unreachable
struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn find_document(&self, _id: &DocumentId) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn update_document(&self, _id: &DocumentId, _title: &str, _body: &Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_ok() {
    let app = build_app(ServerConfig::default(), Arc::new(InMemoryDocumentStore::new()));
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let app = build_app(ServerConfig::default(), Arc::new(UnreachableStore));
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], 503);
    assert_eq!(body["error"], "document store unavailable");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = build_app(ServerConfig::default(), Arc::new(InMemoryDocumentStore::new()));
    let response = app.oneshot(get("/collab/notes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_socket_route_requires_upgrade() {
    let app = build_app(ServerConfig::default(), Arc::new(InMemoryDocumentStore::new()));
    let response = app.oneshot(get("/collab/ws?token=garbage")).await.unwrap();
    assert!(response.status().is_client_error(), "got {}", response.status());
}

#[tokio::test]
async fn test_create_app_without_database() {
    let app = create_app(ServerConfig::default()).await.unwrap();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
