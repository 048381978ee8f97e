//! Shared frame model and JSON codec for the whiteboard's realtime transport.
//!
//! This crate owns the wire representation used by the relay, the browser
//! client, and the CLI. A frame is a named event with an optional JSON
//! payload. The relay routes on `event` and never inspects `data`; only
//! clients decode payloads into a [`Segment`].

mod segment;

pub use segment::{Segment, Tool};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// EVENT NAMES
// =============================================================================

/// A stroke segment, peer to peer.
pub const EVENT_DRAWING: &str = "drawing";

/// Wipe the surface, peer to peer. Carries no payload.
pub const EVENT_CLEAR_CANVAS: &str = "clear-canvas";

/// Relay greeting sent once to a new peer.
pub const EVENT_CONNECTED: &str = "connected";

/// Relay complaint about an inbound message it could not parse.
pub const EVENT_ERROR: &str = "error";

/// Frame data key for the relay-assigned peer id.
pub const FRAME_PEER_ID: &str = "peer_id";

/// Frame data key for error messages.
pub const FRAME_MESSAGE: &str = "message";

// =============================================================================
// TYPES
// =============================================================================

/// Error returned by the codec and payload accessors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text was not a JSON frame, or the payload did not match the schema.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// A tool name outside the fixed set.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// A payload accessor was called on a frame carrying another event.
    #[error("expected `{expected}` frame, found `{found}`")]
    UnexpectedEvent { expected: &'static str, found: String },
}

/// Event kinds the whiteboard understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Drawing,
    ClearCanvas,
    Connected,
    Error,
}

impl EventKind {
    /// Wire name of the event.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Drawing => EVENT_DRAWING,
            Self::ClearCanvas => EVENT_CLEAR_CANVAS,
            Self::Connected => EVENT_CONNECTED,
            Self::Error => EVENT_ERROR,
        }
    }

    /// Look up a kind by wire name. Unknown names return `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            EVENT_DRAWING => Some(Self::Drawing),
            EVENT_CLEAR_CANVAS => Some(Self::ClearCanvas),
            EVENT_CONNECTED => Some(Self::Connected),
            EVENT_ERROR => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single message on the realtime wire protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name, e.g. `"drawing"`.
    pub event: String,
    /// Arbitrary JSON payload. `Null` means "no payload" and is omitted on the wire.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self { event: event.into(), data }
    }

    /// A `drawing` frame carrying one segment.
    #[must_use]
    pub fn drawing(segment: &Segment) -> Self {
        Self::new(EVENT_DRAWING, segment.to_value())
    }

    /// A payload-free `clear-canvas` frame.
    #[must_use]
    pub fn clear_canvas() -> Self {
        Self::new(EVENT_CLEAR_CANVAS, Value::Null)
    }

    /// Greeting for a freshly registered peer.
    #[must_use]
    pub fn connected(peer_id: &str) -> Self {
        Self::new(EVENT_CONNECTED, serde_json::json!({ FRAME_PEER_ID: peer_id }))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EVENT_ERROR, serde_json::json!({ FRAME_MESSAGE: message.into() }))
    }
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl Frame {
    /// The event kind, or `None` for names this crate does not know.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_name(&self.event)
    }

    /// Decode the payload of a `drawing` frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedEvent`] for any other event and
    /// [`CodecError::Json`] when the payload does not match the segment schema.
    pub fn segment(&self) -> Result<Segment, CodecError> {
        if self.kind() != Some(EventKind::Drawing) {
            return Err(CodecError::UnexpectedEvent { expected: EVENT_DRAWING, found: self.event.clone() });
        }
        Ok(Segment::deserialize(&self.data)?)
    }

    /// String field from the payload, if present.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode a frame as JSON text.
#[must_use]
pub fn encode_frame(frame: &Frame) -> String {
    // A string key and a `Value` payload always serialize; the empty fallback
    // is unreachable in practice.
    serde_json::to_string(frame).unwrap_or_default()
}

/// Decode JSON text into a frame. Only the envelope is checked; the payload
/// is kept as raw JSON.
///
/// # Errors
///
/// Returns [`CodecError::Json`] when the text is not a frame envelope.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
