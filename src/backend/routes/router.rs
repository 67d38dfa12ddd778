/**
 * Router Configuration
 *
 * # Routes
 *
 * - `GET /collab/ws` - WebSocket upgrade for collaborative editing
 * - `GET /health`    - document store liveness
 *
 * Anything else falls through to a 404. Every request is traced through
 * `tower_http::trace::TraceLayer`.
 */

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::backend::collab::handle_collab_socket;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::DocumentStore;

pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/collab/ws", get(handle_collab_socket))
        .route("/health", get(health))
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health(State(store): State<Arc<dyn DocumentStore>>) -> Result<Json<Value>, BackendError> {
    store.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
