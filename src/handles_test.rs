#![allow(clippy::float_cmp)]

use super::*;

fn names(list: &[HandlePlacement]) -> Vec<&'static str> {
    list.iter().map(|h| h.name.as_str()).collect()
}

// =============================================================
// HandleName
// =============================================================

#[test]
fn cursors_match_direction() {
    assert_eq!(HandleName::W.cursor(), "ew-resize");
    assert_eq!(HandleName::E.cursor(), "ew-resize");
    assert_eq!(HandleName::N.cursor(), "ns-resize");
    assert_eq!(HandleName::S.cursor(), "ns-resize");
    assert_eq!(HandleName::Nw.cursor(), "nwse-resize");
    assert_eq!(HandleName::Se.cursor(), "nwse-resize");
    assert_eq!(HandleName::Ne.cursor(), "nesw-resize");
    assert_eq!(HandleName::Sw.cursor(), "nesw-resize");
}

#[test]
fn edge_handles_lock_the_other_axis() {
    assert_eq!(HandleName::W.lock(), Some(Axis::Y));
    assert_eq!(HandleName::E.lock(), Some(Axis::Y));
    assert_eq!(HandleName::N.lock(), Some(Axis::X));
    assert_eq!(HandleName::S.lock(), Some(Axis::X));
    for corner in [HandleName::Nw, HandleName::Ne, HandleName::Sw, HandleName::Se] {
        assert_eq!(corner.lock(), None);
        assert!(!corner.is_edge());
    }
}

#[test]
fn moving_corners() {
    assert_eq!(HandleName::W.moving_corner(), Corner::Nw);
    assert_eq!(HandleName::N.moving_corner(), Corner::Ne);
    assert_eq!(HandleName::S.moving_corner(), Corner::Sw);
    assert_eq!(HandleName::E.moving_corner(), Corner::Se);
    assert_eq!(HandleName::Sw.moving_corner(), Corner::Sw);
}

#[test]
fn anchor_is_opposite_corner() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(Corner::Nw.opposite().of(&r), Point::new(40.0, 60.0));
    assert_eq!(Corner::Ne.opposite().of(&r), Point::new(10.0, 60.0));
    assert_eq!(Corner::Sw.opposite().of(&r), Point::new(40.0, 20.0));
    assert_eq!(Corner::Se.opposite().of(&r), Point::new(10.0, 20.0));
}

#[test]
fn offsets_sit_on_edges() {
    assert_eq!(HandleName::W.offset(40.0, 20.0), Point::new(0.0, 10.0));
    assert_eq!(HandleName::N.offset(40.0, 20.0), Point::new(20.0, 0.0));
    assert_eq!(HandleName::S.offset(40.0, 20.0), Point::new(20.0, 20.0));
    assert_eq!(HandleName::E.offset(40.0, 20.0), Point::new(40.0, 10.0));
    assert_eq!(HandleName::Se.offset(40.0, 20.0), Point::new(40.0, 20.0));
}

// =============================================================
// visible_handles
// =============================================================

#[test]
fn large_shape_has_all_handles_in_order() {
    let list = visible_handles(100.0, 100.0, 1.0);
    assert_eq!(names(&list), vec!["w", "n", "s", "e", "nw", "ne", "sw", "se"]);
}

#[test]
fn small_shape_has_only_corners() {
    let list = visible_handles(20.0, 20.0, 1.0);
    assert_eq!(names(&list), vec!["nw", "ne", "sw", "se"]);
}

#[test]
fn short_wide_shape_drops_vertical_edges() {
    // 15 tall: not spacious vertically, so no w/e.
    let list = visible_handles(50.0, 15.0, 1.0);
    assert_eq!(names(&list), vec!["n", "s", "nw", "ne", "sw", "se"]);
}

#[test]
fn visibility_uses_on_screen_size() {
    assert_eq!(visible_handles(30.0, 30.0, 0.5).len(), 4);
    assert_eq!(visible_handles(30.0, 30.0, 1.0).len(), 8);
}

#[test]
fn recommended_size_scales_inversely() {
    assert_eq!(recommended_size(1.0), 10.0);
    assert_eq!(recommended_size(2.0), 5.0);
    let list = visible_handles(100.0, 100.0, 0.5);
    assert!(list.iter().all(|h| h.recommended_size == 20.0));
}
