//! Domain services used by websocket routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the peer registry and fan-out so route handlers can
//! stay focused on protocol translation.

pub mod relay;
