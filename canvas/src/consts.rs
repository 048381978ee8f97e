//! Shared constants for the canvas crate.

// ── Tool state defaults ─────────────────────────────────────────

/// Base stroke width a fresh client starts with.
pub const DEFAULT_WIDTH: f64 = 5.0;

/// Stroke color a fresh client starts with.
pub const DEFAULT_COLOR: &str = "#000000";

// ── Rendering ───────────────────────────────────────────────────

/// Color the eraser paints with; matches the page background.
pub const ERASER_COLOR: &str = "#ffffff";
