/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Load the document store named by the configuration
 * 2. Build `AppState` (room registry, Identity Gate, collaboration service)
 * 3. Create the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::DocumentStore;

/// Create the Axum application from a loaded configuration
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("Initializing collaboration server");
    tracing::debug!("Configuration: {:?}", config);

    let store = load_store(&config).await?;
    Ok(build_app(config, store))
}

/// Assemble the router around an existing store
pub fn build_app(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Router<()> {
    let state = AppState::new(config, store);
    tracing::info!(
        "Collaboration state ready (max frame {} bytes)",
        state.config.max_message_size
    );
    create_router(state)
}
