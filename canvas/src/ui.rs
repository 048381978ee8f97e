//! Tool, color and width chosen through the UI controls.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use frames::{Segment, Tool};

use crate::consts::{DEFAULT_COLOR, DEFAULT_WIDTH};
use crate::surface::Point;

/// Per-client drawing settings. Never shared with peers except as fields
/// of the segments they produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolState {
    tool: Tool,
    color: String,
    width: f64,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            color: DEFAULT_COLOR.to_owned(),
            width: DEFAULT_WIDTH,
        }
    }
}

impl ToolState {
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Set the stroke color. Picking a color also switches to the pen.
    pub fn select_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.tool = Tool::Pen;
    }

    /// Set the base width. Returns `false` and keeps the old width when the
    /// value is not a positive finite number.
    pub fn set_width(&mut self, width: f64) -> bool {
        if width.is_finite() && width > 0.0 {
            self.width = width;
            true
        } else {
            false
        }
    }

    /// Set the base width from the raw text of the width control.
    pub fn set_width_input(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<f64>() {
            Ok(width) => self.set_width(width),
            Err(_) => false,
        }
    }

    /// Whether `tool` should show as selected.
    #[must_use]
    pub fn is_selected_tool(&self, tool: Tool) -> bool {
        self.tool == tool
    }

    /// Whether the color swatch for `color` should show as selected.
    #[must_use]
    pub fn is_selected_color(&self, color: &str) -> bool {
        self.color.eq_ignore_ascii_case(color)
    }

    /// A segment from `from` to `to` tagged with the current settings.
    #[must_use]
    pub fn segment(&self, from: Point, to: Point) -> Segment {
        Segment {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            tool: self.tool,
            color: self.color.clone(),
            width: self.width,
        }
    }
}
