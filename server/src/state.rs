//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the registry of connected peers: one bounded outbound channel
//! per connection, drained by that connection's socket task. There is no
//! drawing history; the registry is the only state the relay keeps.

use std::collections::HashMap;
use std::sync::Arc;

use frames::Frame;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::DEFAULT_PEER_QUEUE_CAPACITY;

/// Relay-assigned identity of one connection. Never sent to other peers.
pub type PeerId = Uuid;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    /// Connected peers: `peer_id` -> sender for outgoing frames.
    pub peers: Arc<RwLock<HashMap<PeerId, mpsc::Sender<Frame>>>>,
    /// Capacity of each peer's outbound channel.
    pub peer_queue_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(peer_queue_capacity: usize) -> Self {
        Self { peers: Arc::new(RwLock::new(HashMap::new())), peer_queue_capacity: peer_queue_capacity.max(1) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PEER_QUEUE_CAPACITY)
    }
}
