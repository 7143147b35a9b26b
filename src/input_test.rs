use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
}

#[test]
fn modifiers_shift_only() {
    let m = Modifiers::shift();
    assert!(m.shift);
    assert!(!m.ctrl);
}

// =============================================================
// PointerEvent
// =============================================================

#[test]
fn pointer_down_is_primary() {
    let ev = PointerEvent::down(3.0, 4.0);
    assert_eq!(ev.kind, PointerKind::Down);
    assert_eq!(ev.client, Point::new(3.0, 4.0));
    assert!(ev.is_primary_only());
}

#[test]
fn pointer_secondary_is_not_primary() {
    assert!(!PointerEvent::down(0.0, 0.0).with_buttons(2).is_primary_only());
    assert!(!PointerEvent::down(0.0, 0.0).with_buttons(3).is_primary_only());
}

#[test]
fn pointer_up_has_no_buttons() {
    let ev = PointerEvent::up(1.0, 1.0);
    assert_eq!(ev.kind, PointerKind::Up);
    assert_eq!(ev.buttons, 0);
}

#[test]
fn pointer_with_modifiers() {
    let ev = PointerEvent::down(0.0, 0.0).with_modifiers(Modifiers::shift());
    assert!(ev.modifiers.shift);
}

// =============================================================
// Key
// =============================================================

#[test]
fn key_arrow_deltas() {
    assert_eq!(Key("ArrowUp".into()).arrow_delta(), Some((0.0, -1.0)));
    assert_eq!(Key("ArrowDown".into()).arrow_delta(), Some((0.0, 1.0)));
    assert_eq!(Key("ArrowLeft".into()).arrow_delta(), Some((-1.0, 0.0)));
    assert_eq!(Key("ArrowRight".into()).arrow_delta(), Some((1.0, 0.0)));
    assert_eq!(Key("a".into()).arrow_delta(), None);
}

#[test]
fn key_delete_variants() {
    assert!(Key("Delete".into()).is_delete());
    assert!(Key("Backspace".into()).is_delete());
    assert!(!Key("Escape".into()).is_delete());
}

// =============================================================
// KeyEvent
// =============================================================

#[test]
fn key_event_prevent_default() {
    let ev = KeyEvent::pressed("Escape");
    assert!(!ev.default_prevented());
    ev.prevent_default();
    assert!(ev.default_prevented());
    assert!(ev.key.is(Key::ESCAPE));
}
