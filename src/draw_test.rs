#![allow(clippy::float_cmp)]

use std::cell::RefCell;

use super::*;
use crate::coords::{Padding, StaticSurface};
use crate::input::KeyEvent;
use crate::shape::{ShapeCallbacks, ShapeController, ShapeOptions, ShapeProps};
use crate::surface::{Surface, SurfaceConfig};

#[derive(Default)]
struct Log {
    added: RefCell<Vec<Rect>>,
    events: RefCell<Vec<String>>,
}

fn controller(s: &Surface, constraints: Constraints) -> (DrawController, Rc<Log>) {
    let log = Rc::new(Log::default());
    let (a, b, c, d) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
    let callbacks = DrawCallbacks::new(move |rect| a.added.borrow_mut().push(rect))
        .on_draw_start(move |_| b.events.borrow_mut().push("start".into()))
        .on_draw(move |_| c.events.borrow_mut().push("draw".into()))
        .on_draw_end(move |end| d.events.borrow_mut().push(format!("end canceled={}", end.canceled)));
    (DrawController::new(&s.context(), constraints, callbacks), log)
}

fn surface_with(config: SurfaceConfig) -> Surface {
    let s = Surface::new(config, Rc::new(StaticSurface::at(Rect::default()))).unwrap();
    s.mount();
    s
}

fn surface() -> Surface {
    surface_with(SurfaceConfig { vector_width: 500.0, vector_height: 500.0, ..SurfaceConfig::default() })
}

#[test]
fn drag_adds_normalized_rect() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());

    assert_eq!(draw.surface_pointer_down(&PointerEvent::down(0.0, 0.0)), Propagation::Continue);
    assert!(draw.is_drawing());
    s.window_pointer_move(&PointerEvent::moved(30.0, 30.0));
    s.window_pointer_up(&PointerEvent::up(30.0, 30.0));

    assert!(!draw.is_drawing());
    assert_eq!(*log.added.borrow(), [Rect::new(0.0, 0.0, 30.0, 30.0)]);
    assert_eq!(*log.events.borrow(), ["start", "draw", "end canceled=false"]);
}

#[test]
fn drag_up_and_left_normalizes() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(40.0, 40.0));
    s.window_pointer_move(&PointerEvent::moved(10.0, 25.0));
    s.window_pointer_up(&PointerEvent::up(10.0, 25.0));
    assert_eq!(*log.added.borrow(), [Rect::new(10.0, 25.0, 30.0, 15.0)]);
}

#[test]
fn draw_uses_last_moved_position() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(1.0, 2.0));
    s.window_pointer_move(&PointerEvent::moved(29.0, 29.0));
    s.window_pointer_move(&PointerEvent::moved(30.0, 30.0));
    s.window_pointer_up(&PointerEvent::up(35.0, 35.0));
    assert_eq!(*log.added.borrow(), [Rect::new(1.0, 2.0, 29.0, 28.0)]);
}

#[test]
fn scaled_and_padded_surface_maps_to_plane() {
    let s = surface_with(SurfaceConfig {
        vector_width: 500.0,
        vector_height: 500.0,
        scale: 0.5,
        padding: Padding::uniform(50.0),
        ..SurfaceConfig::default()
    });
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(50.0, 50.0));
    s.window_pointer_move(&PointerEvent::moved(80.0, 80.0));
    s.window_pointer_up(&PointerEvent::up(80.0, 80.0));
    assert_eq!(*log.added.borrow(), [Rect::new(0.0, 0.0, 60.0, 60.0)]);
}

#[test]
fn zero_extent_on_either_axis_is_discarded() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(10.0, 10.0));
    s.window_pointer_up(&PointerEvent::up(10.0, 10.0));

    draw.surface_pointer_down(&PointerEvent::down(10.0, 10.0));
    s.window_pointer_move(&PointerEvent::moved(10.0, 90.0));
    s.window_pointer_up(&PointerEvent::up(10.0, 90.0));

    assert!(log.added.borrow().is_empty());
    assert_eq!(log.events.borrow().iter().filter(|e| e.starts_with("end")).count(), 2);
}

#[test]
fn escape_cancels_draw() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(0.0, 0.0));
    s.window_pointer_move(&PointerEvent::moved(30.0, 30.0));
    s.key_down(&KeyEvent::pressed(Key::ESCAPE));
    assert!(!draw.is_drawing());

    s.window_pointer_up(&PointerEvent::up(30.0, 30.0));
    assert!(log.added.borrow().is_empty());
    assert_eq!(*log.events.borrow(), ["start", "draw", "end canceled=true"]);
}

#[test]
fn other_keys_do_not_cancel() {
    let s = surface();
    let (draw, _log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(0.0, 0.0));
    s.key_down(&KeyEvent::pressed(Key::ARROW_LEFT));
    assert!(draw.is_drawing());
}

#[test]
fn resize_constraint_applies_to_moving_corner() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::clamped_to_plane());

    draw.surface_pointer_down(&PointerEvent::down(400.0, 20.0));
    s.window_pointer_move(&PointerEvent::moved(600.0, -10.0));
    s.window_pointer_up(&PointerEvent::up(600.0, -10.0));
    assert_eq!(*log.added.borrow(), [Rect::new(400.0, 0.0, 100.0, 20.0)]);
}

#[test]
fn secondary_button_does_not_start() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(0.0, 0.0).with_buttons(2));
    assert!(!draw.is_drawing());
    assert!(log.events.borrow().is_empty());
}

#[test]
fn unmounted_host_drops_the_press() {
    let s = Surface::new(SurfaceConfig::default(), Rc::new(StaticSurface::unmounted())).unwrap();
    s.mount();
    let (draw, log) = controller(&s, Constraints::default());

    draw.surface_pointer_down(&PointerEvent::down(0.0, 0.0));
    assert!(!draw.is_drawing());
    assert!(log.events.borrow().is_empty());
}

#[test]
fn preview_tracks_gesture() {
    let s = surface();
    let (draw, _log) = controller(&s, Constraints::default());
    assert!(draw.preview().is_none());

    draw.surface_pointer_down(&PointerEvent::down(5.0, 5.0));
    s.window_pointer_move(&PointerEvent::moved(25.0, 15.0));
    let preview = draw.preview().unwrap();
    assert_eq!(preview.shape_id, DRAW_PREVIEW_ID);
    assert_eq!(preview.rect, Rect::new(5.0, 5.0, 20.0, 10.0));
    assert!(preview.disabled);
    assert!(preview.is_internal_component);
}

#[test]
fn shape_press_cancels_draw_in_progress() {
    let s = surface();
    let (draw, log) = controller(&s, Constraints::default());
    let sh = ShapeController::new(
        &s.context(),
        "a",
        ShapeProps::at(Rect::new(100.0, 100.0, 20.0, 20.0)),
        ShapeOptions::default(),
        ShapeCallbacks::default(),
    )
    .unwrap();

    draw.surface_pointer_down(&PointerEvent::down(0.0, 0.0));
    s.window_pointer_move(&PointerEvent::moved(30.0, 30.0));
    sh.body_pointer_down(&PointerEvent::down(110.0, 110.0));
    assert!(!draw.is_drawing());

    s.window_pointer_up(&PointerEvent::up(110.0, 110.0));
    assert!(log.added.borrow().is_empty());
    assert_eq!(*log.events.borrow(), ["start", "draw", "end canceled=true"]);
}
