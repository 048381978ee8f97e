//! Relay service: peer registration and fan-out.
//!
//! DESIGN
//! ======
//! Every connection registers an outbound channel under a fresh peer id.
//! Broadcasting walks the registry and `try_send`s a clone of the frame to
//! every peer except the sender. Delivery is at-most-once: a peer whose
//! queue is full or closed simply misses the frame, and nobody else is
//! held up waiting for it.

use frames::Frame;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};

use crate::state::{AppState, PeerId};

/// Register a peer's outbound channel. Returns the number of connected peers.
pub async fn register(state: &AppState, peer_id: PeerId, tx: mpsc::Sender<Frame>) -> usize {
    let mut peers = state.peers.write().await;
    peers.insert(peer_id, tx);
    info!(%peer_id, peers = peers.len(), "peer registered");
    peers.len()
}

/// Remove a peer. Returns the number of peers still connected.
pub async fn deregister(state: &AppState, peer_id: PeerId) -> usize {
    let mut peers = state.peers.write().await;
    peers.remove(&peer_id);
    info!(%peer_id, remaining = peers.len(), "peer deregistered");
    peers.len()
}

/// Number of currently registered peers.
pub async fn peer_count(state: &AppState) -> usize {
    state.peers.read().await.len()
}

/// Send `frame` to every registered peer except `exclude`.
///
/// Returns how many peers accepted the frame into their queue.
pub async fn broadcast(state: &AppState, frame: &Frame, exclude: Option<PeerId>) -> usize {
    let peers = state.peers.read().await;
    let mut delivered = 0;

    for (peer_id, tx) in peers.iter() {
        if exclude == Some(*peer_id) {
            continue;
        }
        // Best-effort: if a peer's channel is full or gone, skip it.
        match tx.try_send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => debug!(%peer_id, event = %frame.event, "peer queue full; frame dropped"),
            Err(TrySendError::Closed(_)) => debug!(%peer_id, event = %frame.event, "peer queue closed; frame dropped"),
        }
    }

    delivered
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
