/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every Axum handler.
 * The `FromRef` implementation lets `/health` extract just the store.
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and safe to share: the room registry and the
 * in-memory store are `Arc`-backed, the store seam is an `Arc<dyn _>`, and the
 * Identity Gate only holds immutable keys.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::IdentityGate;
use crate::backend::collab::{CollabService, RoomRegistry};
use crate::backend::server::config::ServerConfig;
use crate::backend::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    /// Join/leave/edit coordination; owns the room registry
    pub collab: CollabService,

    /// Document store seam, also used by `/health`
    pub store: Arc<dyn DocumentStore>,

    /// Bearer token verification for socket handshakes
    pub identity: IdentityGate,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let identity = IdentityGate::new(&config.jwt_secret);
        let collab = CollabService::new(RoomRegistry::new(), store.clone());
        Self {
            collab,
            store,
            identity,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<dyn DocumentStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
