use super::*;

fn style() -> StrokeStyle {
    StrokeStyle {
        color: "#123456".into(),
        opacity: 1.0,
        width: 2.0,
        cap: LineCap::Round,
        join: LineJoin::Round,
    }
}

#[test]
fn css_keywords() {
    assert_eq!(LineCap::Round.as_css(), "round");
    assert_eq!(LineCap::Butt.as_css(), "butt");
    assert_eq!(LineJoin::Round.as_css(), "round");
    assert_eq!(LineJoin::Bevel.as_css(), "bevel");
}

#[test]
fn recording_surface_keeps_call_order() {
    let mut surface = RecordingSurface::new(10, 10);
    surface
        .stroke_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), &style())
        .expect("record stroke");
    surface.clear().expect("record clear");
    surface.resize(20, 30).expect("record resize");

    assert_eq!(surface.size(), (20, 30));
    assert_eq!(surface.ops().len(), 3);
    assert!(matches!(surface.ops()[0], SurfaceOp::Stroke { .. }));
    assert_eq!(surface.ops()[1], SurfaceOp::Clear);
    assert_eq!(surface.ops()[2], SurfaceOp::Resize { width: 20, height: 30 });
}

#[test]
fn strokes_filters_to_stroke_styles() {
    let mut surface = RecordingSurface::new(4, 4);
    surface.clear().expect("record clear");
    surface
        .stroke_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), &style())
        .expect("record stroke");

    let styles: Vec<_> = surface.strokes().collect();
    assert_eq!(styles, vec![&style()]);
}

#[test]
fn take_ops_drains() {
    let mut surface = RecordingSurface::new(4, 4);
    surface.clear().expect("record clear");
    assert_eq!(surface.take_ops(), vec![SurfaceOp::Clear]);
    assert!(surface.ops().is_empty());
}

#[test]
fn surface_error_messages() {
    assert_eq!(
        SurfaceError::Alloc { width: 0, height: 5 }.to_string(),
        "cannot allocate a 0x5 surface"
    );
}
