#![allow(clippy::float_cmp)]

use frames::Tool;

use super::*;
use crate::raster::RasterSurface;
use crate::surface::{LineCap, LineJoin, RecordingSurface, SurfaceOp};

fn seg(tool: Tool, color: &str, width: f64) -> Segment {
    Segment {
        x1: 10.0,
        y1: 10.0,
        x2: 20.0,
        y2: 20.0,
        tool,
        color: color.into(),
        width,
    }
}

#[test]
fn pen_segment_renders_opaque_round_stroke() {
    let mut surface = RecordingSurface::new(100, 100);
    draw_segment(&mut surface, &seg(Tool::Pen, "#000000", 5.0)).expect("draw");

    let [SurfaceOp::Stroke { from, to, style }] = surface.ops() else {
        panic!("expected one stroke, got {:?}", surface.ops());
    };
    assert_eq!(*from, Point::new(10.0, 10.0));
    assert_eq!(*to, Point::new(20.0, 20.0));
    assert_eq!(style.color, "#000000");
    assert_eq!(style.opacity, 1.0);
    assert_eq!(style.width, 5.0);
    assert_eq!(style.cap, LineCap::Round);
    assert_eq!(style.join, LineJoin::Round);
}

#[test]
fn tool_changes_style_only() {
    for tool in Tool::ALL {
        let mut surface = RecordingSurface::new(100, 100);
        draw_segment(&mut surface, &seg(tool, "#336699", 2.0)).expect("draw");
        let [SurfaceOp::Stroke { from, to, .. }] = surface.ops() else {
            panic!("{tool}: expected one stroke");
        };
        assert_eq!(*from, Point::new(10.0, 10.0), "{tool}");
        assert_eq!(*to, Point::new(20.0, 20.0), "{tool}");
    }
}

#[test]
fn brush_and_eraser_widen() {
    let mut surface = RecordingSurface::new(100, 100);
    draw_segment(&mut surface, &seg(Tool::Brush, "#336699", 2.0)).expect("draw");
    draw_segment(&mut surface, &seg(Tool::Eraser, "#336699", 2.0)).expect("draw");

    let widths: Vec<f64> = surface.strokes().map(|s| s.width).collect();
    assert_eq!(widths, vec![4.0, 6.0]);
    let colors: Vec<&str> = surface.strokes().map(|s| s.color.as_str()).collect();
    assert_eq!(colors, vec!["#336699", "#ffffff"]);
}

#[test]
fn non_positive_or_non_finite_width_draws_nothing() {
    let mut surface = RecordingSurface::new(100, 100);
    for width in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        draw_segment(&mut surface, &seg(Tool::Pen, "#000000", width)).expect("draw");
    }
    assert!(surface.ops().is_empty());
}

#[test]
fn same_segment_same_pixels() {
    let segment = seg(Tool::Pencil, "#aa3300", 3.0);

    let mut a = RasterSurface::new(64, 64).expect("alloc");
    let mut b = RasterSurface::new(64, 64).expect("alloc");
    draw_segment(&mut a, &segment).expect("draw a");
    draw_segment(&mut b, &segment).expect("draw b");

    assert!(!a.is_blank());
    assert_eq!(a.data(), b.data());
}

#[test]
fn coordinates_are_not_rescaled_between_sizes() {
    // A segment from a large canvas lands at the same absolute pixels on a
    // smaller one; whatever falls outside is simply cut off.
    let segment = Segment {
        x1: 5.0,
        y1: 5.0,
        x2: 200.0,
        y2: 5.0,
        tool: Tool::Pen,
        color: "#000000".into(),
        width: 4.0,
    };

    let mut small = RasterSurface::new(50, 20).expect("alloc");
    let mut large = RasterSurface::new(300, 20).expect("alloc");
    draw_segment(&mut small, &segment).expect("draw small");
    draw_segment(&mut large, &segment).expect("draw large");

    assert_eq!(small.pixel(30, 5), Some([0, 0, 0, 255]));
    assert_eq!(large.pixel(30, 5), Some([0, 0, 0, 255]));
    assert_eq!(large.pixel(150, 5), Some([0, 0, 0, 255]));
}

#[test]
fn clear_empties_surface() {
    let mut surface = RasterSurface::new(32, 32).expect("alloc");
    draw_segment(&mut surface, &seg(Tool::Pen, "#000000", 5.0)).expect("draw");
    clear(&mut surface).expect("clear");
    assert!(surface.is_blank());
}

#[test]
fn works_through_trait_objects() {
    let mut surface = RecordingSurface::new(10, 10);
    let dyn_surface: &mut dyn Surface = &mut surface;
    draw_segment(&mut *dyn_surface, &seg(Tool::Pen, "#000000", 1.0)).expect("draw");
    clear(&mut *dyn_surface).expect("clear");
    assert_eq!(surface.ops().len(), 2);
}
