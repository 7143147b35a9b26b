//! Input model: pointer and keyboard events as the controllers see them.
//!
//! Hosts translate their native events into these types. Pointer positions
//! stay in client (viewport) pixels; the [`crate::coords::CoordinateMapper`]
//! turns them into plane coordinates. Only single-pointer primary-button
//! drags and discrete key presses are modeled.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::cell::Cell;

use crate::geometry::Point;

/// Bit set in [`PointerEvent::buttons`] while the primary button is held.
pub const PRIMARY_BUTTON: u16 = 1;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub fn shift() -> Self {
        Self { shift: true, ..Default::default() }
    }
}

/// Which phase of a pointer gesture an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Position relative to the host viewport, in CSS pixels.
    pub client: Point,
    /// Pressed-buttons bit set, as reported by the browser's `buttons`.
    pub buttons: u16,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Primary-button press at `(x, y)`.
    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self { kind: PointerKind::Down, client: Point::new(x, y), buttons: PRIMARY_BUTTON, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self { kind: PointerKind::Move, client: Point::new(x, y), buttons: PRIMARY_BUTTON, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self { kind: PointerKind::Up, client: Point::new(x, y), buttons: 0, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_buttons(mut self, buttons: u16) -> Self {
        self.buttons = buttons;
        self
    }

    /// Whether exactly the primary button is held. Anything else is ignored
    /// by the pointer-down handlers.
    #[must_use]
    pub fn is_primary_only(&self) -> bool {
        self.buttons == PRIMARY_BUTTON
    }
}

/// A keyboard key, holding the key name as reported by the browser
/// (e.g. `"Delete"`, `"Escape"`, `"ArrowUp"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    pub const ESCAPE: &'static str = "Escape";
    pub const BACKSPACE: &'static str = "Backspace";
    pub const DELETE: &'static str = "Delete";
    pub const ARROW_UP: &'static str = "ArrowUp";
    pub const ARROW_DOWN: &'static str = "ArrowDown";
    pub const ARROW_LEFT: &'static str = "ArrowLeft";
    pub const ARROW_RIGHT: &'static str = "ArrowRight";

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }

    /// Unit step for an arrow key, or `None` for any other key.
    #[must_use]
    pub fn arrow_delta(&self) -> Option<(f64, f64)> {
        match self.0.as_str() {
            Self::ARROW_UP => Some((0.0, -1.0)),
            Self::ARROW_DOWN => Some((0.0, 1.0)),
            Self::ARROW_LEFT => Some((-1.0, 0.0)),
            Self::ARROW_RIGHT => Some((1.0, 0.0)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.is(Self::BACKSPACE) || self.is(Self::DELETE)
    }
}

/// A key-down event. Handlers mark it consumed with [`KeyEvent::prevent_default`].
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    default_prevented: Cell<bool>,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self { key: Key(key.into()), modifiers, default_prevented: Cell::new(false) }
    }

    #[must_use]
    pub fn pressed(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::default())
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Whether a pointer-down was consumed by the element it hit, or should
/// continue to the layers beneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Stop,
    Continue,
}
