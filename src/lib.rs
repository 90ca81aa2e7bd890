pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod websocket;
pub mod ws;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use config::Config;
use services::BlobStore;
use ws::{RoomRegistry, SessionGateway};

/// Shared state handed to every HTTP and WebSocket handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: SessionGateway,
    pub blobs: BlobStore,
    /// Open WebSocket transports.
    pub connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let blobs = BlobStore::new(config.blob_ttl(), config.blob_capacity);
        let registry = RoomRegistry::new(blobs.clone());
        let gateway = SessionGateway::new(registry, config.max_clip_chars, config.grace_window());
        Self {
            config: Arc::new(config),
            gateway,
            blobs,
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}
