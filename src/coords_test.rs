#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn point_approx_eq(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn mapper(host: Rc<StaticSurface>, dims: Dimensions) -> CoordinateMapper {
    CoordinateMapper::new(host, Rc::new(Cell::new(dims)))
}

// =============================================================
// Padding
// =============================================================

#[test]
fn padding_uniform_sets_all_sides() {
    let p = Padding::uniform(4.0);
    assert_eq!(p, Padding { top: 4.0, right: 4.0, bottom: 4.0, left: 4.0 });
}

#[test]
fn padding_deserializes_from_number() {
    let p: Padding = serde_json::from_str("12").unwrap_or_default();
    assert_eq!(p, Padding::uniform(12.0));
}

#[test]
fn padding_deserializes_partial_sides() {
    let p: Padding = serde_json::from_str(r#"{"top": 5, "left": 2}"#).unwrap_or_default();
    assert_eq!(p, Padding { top: 5.0, right: 0.0, bottom: 0.0, left: 2.0 });
}

// =============================================================
// Dimensions
// =============================================================

#[test]
fn vector_padding_divides_by_scale() {
    let dims = Dimensions { vector_width: 100.0, vector_height: 50.0, scale: 0.5, padding: Padding::uniform(50.0) };
    assert_eq!(dims.vector_padding(), Padding::uniform(100.0));
}

#[test]
fn backing_rect_covers_padding() {
    let dims = Dimensions { vector_width: 100.0, vector_height: 50.0, scale: 2.0, padding: Padding::uniform(10.0) };
    assert_eq!(dims.backing_rect(), Rect::new(-5.0, -5.0, 110.0, 60.0));
}

// =============================================================
// CoordinateMapper
// =============================================================

#[test]
fn to_plane_identity() {
    let m = mapper(Rc::new(StaticSurface::at(Rect::default())), Dimensions::default());
    let p = m.to_plane(&PointerEvent::down(30.0, 40.0), None);
    assert!(matches!(p, Ok(pt) if point_approx_eq(pt, Point::new(30.0, 40.0))));
}

#[test]
fn to_plane_subtracts_surface_origin() {
    let m = mapper(Rc::new(StaticSurface::at(Rect::new(100.0, 200.0, 50.0, 50.0))), Dimensions::default());
    let p = m.to_plane(&PointerEvent::down(130.0, 240.0), None);
    assert!(matches!(p, Ok(pt) if point_approx_eq(pt, Point::new(30.0, 40.0))));
}

#[test]
fn to_plane_applies_padding_then_scale() {
    let dims = Dimensions { vector_width: 100.0, vector_height: 100.0, scale: 0.5, padding: Padding::uniform(50.0) };
    let m = mapper(Rc::new(StaticSurface::at(Rect::default())), dims);
    let start = m.to_plane(&PointerEvent::down(50.0, 50.0), None);
    let end = m.to_plane(&PointerEvent::moved(80.0, 80.0), None);
    assert!(matches!(start, Ok(pt) if point_approx_eq(pt, Point::new(0.0, 0.0))));
    assert!(matches!(end, Ok(pt) if point_approx_eq(pt, Point::new(60.0, 60.0))));
}

#[test]
fn to_plane_subtracts_offset() {
    let m = mapper(Rc::new(StaticSurface::at(Rect::default())), Dimensions::default());
    let p = m.to_plane(&PointerEvent::down(30.0, 40.0), Some(Point::new(5.0, 10.0)));
    assert!(matches!(p, Ok(pt) if point_approx_eq(pt, Point::new(25.0, 30.0))));
}

#[test]
fn to_plane_unmounted_is_error() {
    let m = mapper(Rc::new(StaticSurface::unmounted()), Dimensions::default());
    let p = m.to_plane(&PointerEvent::down(30.0, 40.0), None);
    assert!(matches!(p, Err(EditorError::SurfaceUnavailable)));
}

#[test]
fn to_plane_measures_on_every_call() {
    let host = Rc::new(StaticSurface::at(Rect::default()));
    let m = mapper(Rc::clone(&host), Dimensions::default());
    let before = m.client_to_plane(Point::new(10.0, 10.0), None);
    host.set_rect(Some(Rect::new(10.0, 0.0, 0.0, 0.0)));
    let after = m.client_to_plane(Point::new(10.0, 10.0), None);
    assert!(matches!(before, Ok(pt) if point_approx_eq(pt, Point::new(10.0, 10.0))));
    assert!(matches!(after, Ok(pt) if point_approx_eq(pt, Point::new(0.0, 10.0))));
}

#[test]
fn static_surface_has_no_dom_hits() {
    let host = StaticSurface::at(Rect::default());
    assert!(host.shape_ids_at(Point::new(0.0, 0.0)).is_empty());
}
