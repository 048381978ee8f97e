//! Input model: pointer samples and the stroke state machine.
//!
//! Mouse and touch events are reduced to a [`PointerSample`] by the host
//! before they reach the engine, so everything here is plain data and can be
//! tested without a browser. [`get_pos`] is the single coordinate-extraction
//! step shared by both input kinds.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::surface::Point;

/// One pointer event, reduced to what position extraction needs.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerSample {
    /// Mouse event carrying its canvas-relative offset.
    Mouse {
        offset: Point,
    },
    /// Touch event carrying the client positions of the active touches and
    /// the top-left corner of the canvas's bounding box.
    Touch {
        touches: Vec<Point>,
        canvas_origin: Point,
    },
}

impl PointerSample {
    #[must_use]
    pub fn mouse(x: f64, y: f64) -> Self {
        Self::Mouse { offset: Point::new(x, y) }
    }

    #[must_use]
    pub fn is_touch(&self) -> bool {
        matches!(self, Self::Touch { .. })
    }
}

/// Canvas-local position of a pointer sample.
///
/// Touch uses the first active touch relative to the canvas origin; mouse
/// uses its offset directly. A touch sample with no active touches has no
/// position.
#[must_use]
pub fn get_pos(sample: &PointerSample) -> Option<Point> {
    match sample {
        PointerSample::Mouse { offset } => Some(*offset),
        PointerSample::Touch { touches, canvas_origin } => touches
            .first()
            .map(|t| Point::new(t.x - canvas_origin.x, t.y - canvas_origin.y)),
    }
}

/// Whether a stroke is in progress, and where it last was.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Pointer is down; `last` is where the previous segment ended.
    Drawing { last: Point },
}

impl InputState {
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    /// The running last position while drawing.
    #[must_use]
    pub fn last(&self) -> Option<Point> {
        match self {
            Self::Drawing { last } => Some(*last),
            Self::Idle => None,
        }
    }
}
