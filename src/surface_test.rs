#![allow(clippy::float_cmp)]

use std::cell::RefCell;

use super::*;
use crate::coords::StaticSurface;
use crate::geometry::{Point, Rect};
use crate::input::Key;
use crate::shape::{ShapeCallbacks, ShapeController, ShapeId, ShapeOptions, ShapeProps};

fn config() -> SurfaceConfig {
    SurfaceConfig { vector_width: 500.0, vector_height: 500.0, ..SurfaceConfig::default() }
}

fn surface_with(config: SurfaceConfig) -> Surface {
    Surface::new(config, Rc::new(StaticSurface::at(Rect::default()))).unwrap()
}

fn shape(s: &Surface, id: &str, rect: Rect) -> ShapeController {
    ShapeController::new(&s.context(), id, ShapeProps::at(rect), ShapeOptions::default(), ShapeCallbacks::default())
        .unwrap()
}

fn focused_id(s: &Surface) -> Option<ShapeId> {
    s.context().focus.focused().map(|h| h.id().clone())
}

// =============================================================
// Config
// =============================================================

#[test]
fn config_parses_numeric_padding() {
    let c = SurfaceConfig::from_json(r#"{"vector_width": 800, "vector_height": 600, "scale": 0.5, "padding": 20}"#)
        .unwrap();
    assert_eq!(c.vector_width, 800.0);
    assert_eq!(c.scale, 0.5);
    assert_eq!(c.padding, Padding::uniform(20.0));
    assert!(c.focus_on_add);
    assert!(c.focus_on_delete);
}

#[test]
fn config_defaults_scale_to_one() {
    let c = SurfaceConfig::from_json("{}").unwrap();
    assert_eq!(c.scale, 1.0);
}

#[test]
fn config_rejects_bad_values() {
    assert!(matches!(SurfaceConfig::from_json(r#"{"scale": 0}"#), Err(EditorError::InvalidScale { .. })));
    assert!(matches!(
        SurfaceConfig::from_json(r#"{"padding": {"top": -1}}"#),
        Err(EditorError::InvalidPadding { side: "top", .. })
    ));
    assert!(matches!(
        SurfaceConfig::from_json(r#"{"vector_width": -5}"#),
        Err(EditorError::InvalidDimensions { .. })
    ));
    assert!(matches!(SurfaceConfig::from_json("{not json"), Err(EditorError::ConfigParse(_))));
}

#[test]
fn new_validates_config() {
    let bad = SurfaceConfig { scale: -1.0, ..config() };
    assert!(Surface::new(bad, Rc::new(StaticSurface::unmounted())).is_err());
}

// =============================================================
// Dimensions and viewport
// =============================================================

#[test]
fn viewport_adds_padding_in_both_spaces() {
    let s = surface_with(SurfaceConfig {
        vector_width: 100.0,
        vector_height: 50.0,
        scale: 2.0,
        padding: Padding::uniform(10.0),
        ..SurfaceConfig::default()
    });
    let v = s.viewport();
    assert_eq!(v.width, 220.0);
    assert_eq!(v.height, 120.0);
    assert_eq!(v.view_box, [-5.0, -5.0, 110.0, 60.0]);
}

#[test]
fn set_dimensions_updates_shared_mapping() {
    let mut s = surface_with(config());
    let mapper = s.context().mapper;
    s.set_dimensions(1000.0, 800.0, 2.0).unwrap();

    assert_eq!(s.dimensions().vector_width, 1000.0);
    assert_eq!(mapper.client_to_plane(Point::new(20.0, 20.0), None).unwrap(), Point::new(10.0, 10.0));
    assert!(s.set_dimensions(10.0, 10.0, 0.0).is_err());
    assert_eq!(s.dimensions().scale, 2.0);
}

// =============================================================
// Window events
// =============================================================

#[test]
fn window_events_before_mount_are_ignored() {
    let s = surface_with(config());
    let moves = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&moves);
    let cb = ShapeCallbacks::default().on_intermediate_change(move |_| *sink.borrow_mut() += 1);
    let sh = ShapeController::new(&s.context(), "a", ShapeProps::at(Rect::new(0.0, 0.0, 50.0, 50.0)), ShapeOptions::default(), cb)
        .unwrap();

    sh.body_pointer_down(&PointerEvent::down(10.0, 10.0));
    s.window_pointer_move(&PointerEvent::moved(20.0, 20.0));
    assert_eq!(*moves.borrow(), 0);

    s.mount();
    s.window_pointer_move(&PointerEvent::moved(20.0, 20.0));
    assert_eq!(*moves.borrow(), 1);
}

#[test]
fn key_down_reaches_focused_shape() {
    let s = surface_with(config());
    s.mount();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let cb = ShapeCallbacks::default().on_change(move |rect, _| sink.borrow_mut().push(rect));
    let sh = ShapeController::new(&s.context(), "a", ShapeProps::at(Rect::new(0.0, 0.0, 50.0, 50.0)), ShapeOptions::default(), cb)
        .unwrap();

    s.key_down(&KeyEvent::pressed(Key::ARROW_DOWN));
    assert!(changes.borrow().is_empty());

    sh.handle_focus();
    let key = KeyEvent::pressed(Key::ARROW_DOWN);
    s.key_down(&key);
    assert!(key.default_prevented());
    assert_eq!(*changes.borrow(), [Rect::new(0.0, 1.0, 50.0, 50.0)]);
}

// =============================================================
// Focus restoration
// =============================================================

#[test]
fn update_focuses_newest_added_shape() {
    let s = surface_with(config());
    let _existing = shape(&s, "existing", Rect::new(0.0, 0.0, 10.0, 10.0));
    s.mount();
    let _first = shape(&s, "first", Rect::new(20.0, 0.0, 10.0, 10.0));
    let _second = shape(&s, "second", Rect::new(40.0, 0.0, 10.0, 10.0));

    s.update();
    assert_eq!(focused_id(&s), Some(ShapeId::from("second")));

    // Additions are consumed by the update.
    if let Some(focused) = s.context().focus.focused() {
        focused.handle_blur();
    }
    s.update();
    assert_eq!(focused_id(&s), None);
}

#[test]
fn update_focuses_nearest_to_deleted_shape() {
    let s = surface_with(config());
    let _a = shape(&s, "a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = shape(&s, "b", Rect::new(100.0, 0.0, 10.0, 10.0));
    let _c = shape(&s, "c", Rect::new(190.0, 0.0, 10.0, 10.0));
    s.mount();

    drop(b);
    s.update();
    assert_eq!(focused_id(&s), Some(ShapeId::from("c")));
}

#[test]
fn equidistant_neighbours_resolve_to_first_registered() {
    let s = surface_with(config());
    let _a = shape(&s, "a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = shape(&s, "b", Rect::new(100.0, 0.0, 10.0, 10.0));
    let _c = shape(&s, "c", Rect::new(200.0, 0.0, 10.0, 10.0));
    s.mount();

    drop(b);
    s.update();
    assert_eq!(focused_id(&s), Some(ShapeId::from("a")));
}

#[test]
fn focus_restoration_can_be_disabled() {
    let s = surface_with(SurfaceConfig { focus_on_add: false, focus_on_delete: false, ..config() });
    s.mount();
    let _a = shape(&s, "a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = shape(&s, "b", Rect::new(100.0, 0.0, 10.0, 10.0));
    drop(b);

    s.update();
    assert_eq!(focused_id(&s), None);
}

#[test]
fn deleting_last_shape_focuses_nothing() {
    let s = surface_with(config());
    let only = shape(&s, "only", Rect::new(0.0, 0.0, 10.0, 10.0));
    s.mount();
    drop(only);
    s.update();
    assert_eq!(focused_id(&s), None);
}
