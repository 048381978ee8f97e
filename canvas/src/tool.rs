//! Per-tool rendering table.
//!
//! Tools differ only in how a segment looks, never in geometry. Each tool
//! maps to one fixed [`ToolStyle`] record; this table is the only place
//! tool appearance is defined.

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

use frames::{Segment, Tool};

use crate::consts::ERASER_COLOR;
use crate::surface::{LineCap, LineJoin, StrokeStyle};

/// How a tool modifies the segment's own color and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolStyle {
    /// Global alpha for the stroke.
    pub opacity: f64,
    /// Multiplier applied to the segment's base width.
    pub width_factor: f64,
    /// Fixed color replacing the segment's color, if any.
    pub color_override: Option<&'static str>,
}

impl ToolStyle {
    /// The table entry for `tool`.
    #[must_use]
    pub const fn of(tool: Tool) -> Self {
        match tool {
            Tool::Pen => Self { opacity: 1.0, width_factor: 1.0, color_override: None },
            Tool::Pencil => Self { opacity: 0.7, width_factor: 1.0, color_override: None },
            Tool::Brush => Self { opacity: 0.3, width_factor: 2.0, color_override: None },
            Tool::Eraser => Self { opacity: 1.0, width_factor: 3.0, color_override: Some(ERASER_COLOR) },
        }
    }

    /// Resolve the final stroke attributes for a segment drawn with this tool.
    #[must_use]
    pub fn stroke(&self, color: &str, base_width: f64) -> StrokeStyle {
        StrokeStyle {
            color: self.color_override.unwrap_or(color).to_owned(),
            opacity: self.opacity,
            width: base_width * self.width_factor,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }
}

/// Stroke attributes for `segment`, from its tool's table entry.
#[must_use]
pub fn stroke_style(segment: &Segment) -> StrokeStyle {
    ToolStyle::of(segment.tool).stroke(&segment.color, segment.width)
}
