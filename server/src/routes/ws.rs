//! WebSocket handler: bidirectional frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, registers a peer and enters a `select!` loop:
//! - Incoming peer frames → parse envelope + route by event name
//! - Frames broadcast by other peers → forward to this peer
//!
//! Routing is pure: it looks only at the event name and returns an
//! `Outcome`. The dispatch layer owns fan-out. Payloads are never
//! validated; a `drawing` frame leaves exactly as it arrived.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register peer → send `connected` with `peer_id`
//! 2. Peer sends frames → route → broadcast to everyone else
//! 3. Close or socket error → deregister

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{EventKind, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::services;
use crate::state::{AppState, PeerId};

// =============================================================================
// OUTCOME
// =============================================================================

/// What the dispatch layer should do with one inbound frame.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Send this frame to every peer except the sender.
    BroadcastExcludeSender(Frame),
    /// Drop the frame.
    Ignore,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let peer_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast frames from peers.
    let (peer_tx, mut peer_rx) = mpsc::channel::<Frame>(state.peer_queue_capacity);

    // Register before greeting so the peer never misses a frame sent after
    // it has seen `connected`.
    services::relay::register(&state, peer_id, peer_tx).await;

    let welcome = Frame::connected(&peer_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_ok() {
        info!(%peer_id, "ws: peer connected");
        serve_peer(&mut socket, &state, peer_id, &mut peer_rx).await;
    }

    services::relay::deregister(&state, peer_id).await;
    info!(%peer_id, "ws: peer disconnected");
}

async fn serve_peer(socket: &mut WebSocket, state: &AppState, peer_id: PeerId, peer_rx: &mut mpsc::Receiver<Frame>) {
    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!(%peer_id, error = %e, "ws: socket error");
                        break;
                    }
                };
                match msg {
                    Message::Text(text) => {
                        if let Some(reply) = process_inbound_text(state, peer_id, &text).await {
                            if send_frame(socket, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = peer_rx.recv() => {
                if send_frame(socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame; returns a frame for the sender,
/// if any.
///
/// Kept apart from the socket so tests can drive dispatch end-to-end with
/// plain channels.
async fn process_inbound_text(state: &AppState, peer_id: PeerId, text: &str) -> Option<Frame> {
    let frame = match frames::decode_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%peer_id, error = %e, "ws: invalid inbound frame");
            return Some(Frame::error(format!("invalid frame: {e}")));
        }
    };

    match route(&frame) {
        Outcome::BroadcastExcludeSender(out) => {
            let delivered = services::relay::broadcast(state, &out, Some(peer_id)).await;
            if out.kind() == Some(EventKind::Drawing) {
                trace!(%peer_id, delivered, "ws: relayed drawing");
            } else {
                info!(%peer_id, event = %out.event, delivered, "ws: relayed frame");
            }
        }
        Outcome::Ignore => {
            debug!(%peer_id, event = %frame.event, "ws: ignored frame");
        }
    }
    None
}

/// Decide what happens to an inbound frame. Looks only at the event name.
fn route(frame: &Frame) -> Outcome {
    match frame.kind() {
        Some(EventKind::Drawing) => Outcome::BroadcastExcludeSender(frame.clone()),
        // Clear is a bare signal; anything attached to it is dropped.
        Some(EventKind::ClearCanvas) => Outcome::BroadcastExcludeSender(Frame::clear_canvas()),
        // Relay-originated events are not accepted from peers.
        Some(EventKind::Connected | EventKind::Error) | None => Outcome::Ignore,
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), axum::Error> {
    let text = frames::encode_frame(frame);
    socket.send(Message::Text(text.into())).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
