/**
 * Server Configuration
 *
 * Loads `ServerConfig` and sets up the document store it points at.
 *
 * # Configuration Sources
 *
 * Lowest to highest priority:
 * 1. Built-in defaults (port 3000, in-memory store, 1 MiB frames)
 * 2. TOML file named by `COLLAB_CONFIG`, if set
 * 3. Environment: `BIND_ADDR`, `SERVER_PORT`, `JWT_SECRET`, `DATABASE_URL`,
 *    `MAX_MESSAGE_SIZE`
 *
 * `.env` is read by `main` before any of this runs.
 *
 * # Database
 *
 * The database is optional. Without `DATABASE_URL` documents live in memory
 * for the life of the process. With it, failing to connect or migrate is a
 * startup error rather than a silent fallback.
 */

use serde::Deserialize;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::store::{DocumentStore, InMemoryDocumentStore, PgDocumentStore, StoreError};

/// Secret used when `JWT_SECRET` is unset; only fit for local development
pub const DEV_JWT_SECRET: &str = "collabnotes-dev-secret-change-me";

/// Default cap on a single inbound frame (1 MiB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "COLLAB_CONFIG";

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            database_url: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

// Keeps secrets out of logs
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("max_message_size", &self.max_message_size)
            .finish()
    }
}

impl ServerConfig {
    /// Load from defaults, the optional TOML file and the process environment
    pub fn load() -> Result<Self, BackendError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!("Reading configuration from {}", path);
                Self::from_file(path.trim())?
            }
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set, using the development secret");
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BackendError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, BackendError> {
        toml::from_str(raw).map_err(|e| BackendError::config(format!("invalid TOML: {}", e)))
    }

    /// Overlay environment values read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), BackendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr
                .trim()
                .parse()
                .map_err(|_| BackendError::config(format!("BIND_ADDR is not a socket address: {}", addr)))?;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| BackendError::config(format!("SERVER_PORT is not a port: {}", port)))?;
            self.bind_addr.set_port(port);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(size) = lookup("MAX_MESSAGE_SIZE") {
            self.max_message_size = size
                .trim()
                .parse()
                .map_err(|_| BackendError::config(format!("MAX_MESSAGE_SIZE is not a number: {}", size)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        if self.jwt_secret.is_empty() {
            return Err(BackendError::config("jwt_secret must not be empty"));
        }
        if self.max_message_size == 0 {
            return Err(BackendError::config("max_message_size must be positive"));
        }
        Ok(())
    }
}

/// Build the document store the configuration points at
///
/// Connects and runs `migrations/` when a database URL is configured,
/// otherwise falls back to an empty in-memory store.
pub async fn load_store(config: &ServerConfig) -> Result<Arc<dyn DocumentStore>, BackendError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("[Store] DATABASE_URL not set, documents are kept in memory only");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    };

    tracing::info!("[Store] Connecting to database...");
    let pool = PgPool::connect(database_url).await.map_err(StoreError::from)?;
    tracing::info!("[Store] Database connection pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("[Store] Database migrations completed");

    Ok(Arc::new(PgDocumentStore::new(pool)))
}
