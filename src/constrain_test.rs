#![allow(clippy::float_cmp)]

use super::*;

fn move_args(x: f64, y: f64) -> ConstrainMoveArgs {
    ConstrainMoveArgs {
        x,
        y,
        width: 20.0,
        height: 10.0,
        original_x: 0.0,
        original_y: 0.0,
        vector_width: 100.0,
        vector_height: 50.0,
    }
}

fn resize_args(moving: Point, lock: Option<Axis>) -> ConstrainResizeArgs {
    ConstrainResizeArgs {
        original_moving_corner: Point::new(30.0, 30.0),
        start_corner: Point::new(10.0, 10.0),
        moving_corner: moving,
        locked_dimension: lock,
        vector_width: 100.0,
        vector_height: 50.0,
    }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_move_is_identity() {
    assert_eq!(default_constrain_move(&move_args(-5.0, 400.0)), Point::new(-5.0, 400.0));
}

#[test]
fn default_resize_is_identity() {
    let moving = Point::new(123.0, -4.0);
    assert_eq!(default_constrain_resize(&resize_args(moving, None)), moving);
}

#[test]
fn constraints_default_uses_identity() {
    let c = Constraints::default();
    assert_eq!(c.apply_move(&move_args(7.0, 8.0)), Point::new(7.0, 8.0));
    assert_eq!(c.apply_resize(&resize_args(Point::new(1.0, 2.0), None)), Point::new(1.0, 2.0));
}

#[test]
fn constraints_with_move_overrides_only_move() {
    let c = Constraints::default().with_move(|a| Point::new(a.x.round(), a.y.round()));
    assert_eq!(c.apply_move(&move_args(7.4, 8.6)), Point::new(7.0, 9.0));
    assert_eq!(c.apply_resize(&resize_args(Point::new(1.5, 2.5), None)), Point::new(1.5, 2.5));
}

// =============================================================
// Clamping
// =============================================================

#[test]
fn clamp_move_keeps_rect_inside_plane() {
    assert_eq!(clamp_move_to_plane(&move_args(-5.0, -1.0)), Point::new(0.0, 0.0));
    assert_eq!(clamp_move_to_plane(&move_args(95.0, 45.0)), Point::new(80.0, 40.0));
    assert_eq!(clamp_move_to_plane(&move_args(10.0, 10.0)), Point::new(10.0, 10.0));
}

#[test]
fn clamp_resize_keeps_corner_inside_plane() {
    let p = clamp_resize_to_plane(&resize_args(Point::new(150.0, -20.0), None));
    assert_eq!(p, Point::new(100.0, 0.0));
}

#[test]
fn clamp_resize_respects_x_lock() {
    let p = clamp_resize_to_plane(&resize_args(Point::new(60.0, 40.0), Some(Axis::X)));
    assert_eq!(p, Point::new(30.0, 40.0));
}

#[test]
fn clamp_resize_respects_y_lock() {
    let p = clamp_resize_to_plane(&resize_args(Point::new(60.0, 40.0), Some(Axis::Y)));
    assert_eq!(p, Point::new(60.0, 30.0));
}

// =============================================================
// Grid snapping
// =============================================================

#[test]
fn snap_resize_rounds_to_step() {
    let snap = snap_resize_to_grid(10.0);
    assert_eq!(snap(&resize_args(Point::new(34.0, 46.0), None)), Point::new(30.0, 50.0));
}

#[test]
fn snap_resize_non_positive_step_is_identity() {
    let snap = snap_resize_to_grid(0.0);
    assert_eq!(snap(&resize_args(Point::new(34.0, 46.0), None)), Point::new(34.0, 46.0));
}

#[test]
fn axis_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Axis::X).unwrap_or_default(), "\"x\"");
}
