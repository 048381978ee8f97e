//! Rendering: the one function that puts a segment on a surface.
//!
//! Local strokes and remote strokes both go through [`draw_segment`], so a
//! segment looks the same on every peer given the same surface size.
//! Coordinates are drawn as-is, with no scaling between peers whose
//! canvases differ in size.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use frames::Segment;

use crate::surface::{Point, Surface, SurfaceError};
use crate::tool::stroke_style;

/// Draw one segment, styled by its tool.
///
/// Segments with a width that is not a positive finite number draw nothing.
///
/// # Errors
///
/// Propagates any error from the surface.
pub fn draw_segment<S: Surface + ?Sized>(surface: &mut S, segment: &Segment) -> Result<(), SurfaceError> {
    if !segment.width.is_finite() || segment.width <= 0.0 {
        log::debug!("render: skipping segment with width {}", segment.width);
        return Ok(());
    }
    let style = stroke_style(segment);
    surface.stroke_line(
        Point::new(segment.x1, segment.y1),
        Point::new(segment.x2, segment.y2),
        &style,
    )
}

/// Erase everything on the surface.
///
/// # Errors
///
/// Propagates any error from the surface.
pub fn clear<S: Surface + ?Sized>(surface: &mut S) -> Result<(), SurfaceError> {
    surface.clear()
}
