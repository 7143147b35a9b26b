//! Browser binding.
//!
//! Connects a [`Surface`] to the DOM: measures the surface element, resolves
//! shape ids under a point, converts DOM events into the input model, and
//! forwards window-level `mousemove`/`mouseup`/`keydown` while attached.

use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, KeyboardEvent, MouseEvent, Window};

use crate::consts::SELECTION_OVERLAY_ID;
use crate::coords::SurfaceHost;
use crate::error::EditorError;
use crate::geometry::{Point, Rect};
use crate::input::{KeyEvent, Modifiers, PointerEvent, PointerKind};
use crate::shape::ShapeId;
use crate::surface::Surface;

const SHAPE_ID_ATTR: &str = "data-shape-id";

fn js_error(err: &JsValue) -> EditorError {
    EditorError::HostBinding(format!("{err:?}"))
}

/// [`SurfaceHost`] over the `<svg>` element the surface is rendered into.
#[derive(Debug, Clone)]
pub struct ElementSurface {
    element: Element,
    document: Document,
}

impl ElementSurface {
    /// # Errors
    ///
    /// Returns [`EditorError::HostBinding`] when the element has no owner document.
    pub fn new(element: Element) -> Result<Self, EditorError> {
        let document = element
            .owner_document()
            .ok_or_else(|| EditorError::HostBinding("surface element has no owner document".into()))?;
        Ok(Self { element, document })
    }
}

impl SurfaceHost for ElementSurface {
    fn bounding_client_rect(&self) -> Option<Rect> {
        if !self.element.is_connected() {
            return None;
        }
        let r = self.element.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.width(), r.height()))
    }

    /// Only a shape's primitives are hit, so the id is read from each hit
    /// element's parent `<g>`.
    #[allow(clippy::cast_possible_truncation)]
    fn shape_ids_at(&self, client: Point) -> Vec<ShapeId> {
        let hits: js_sys::Array = self.document.elements_from_point(client.x as f32, client.y as f32);
        hits.iter()
            .filter_map(|hit| hit.dyn_ref::<Element>().and_then(|el| el.parent_node()))
            .filter_map(|parent| parent.dyn_ref::<Element>().and_then(|g| g.get_attribute(SHAPE_ID_ATTR)))
            .filter(|id| id != SELECTION_OVERLAY_ID)
            .map(ShapeId::from)
            .collect()
    }
}

fn modifiers_of(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

#[must_use]
pub fn pointer_event_from_mouse(event: &MouseEvent, kind: PointerKind) -> PointerEvent {
    PointerEvent {
        kind,
        client: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
        buttons: event.buttons(),
        modifiers: modifiers_of(event.shift_key(), event.ctrl_key(), event.alt_key(), event.meta_key()),
    }
}

#[must_use]
pub fn key_event_from_keyboard(event: &KeyboardEvent) -> KeyEvent {
    KeyEvent::new(
        event.key(),
        modifiers_of(event.shift_key(), event.ctrl_key(), event.alt_key(), event.meta_key()),
    )
}

/// Window listeners forwarding into a surface. Detached on drop.
pub struct WindowListeners {
    window: Window,
    listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl std::fmt::Debug for WindowListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.listeners.iter().map(|(name, _)| *name).collect();
        f.debug_struct("WindowListeners").field("listeners", &names).finish_non_exhaustive()
    }
}

impl WindowListeners {
    /// # Errors
    ///
    /// Returns [`EditorError::HostBinding`] when there is no global window or
    /// a listener cannot be added.
    pub fn attach(surface: Rc<Surface>) -> Result<Self, EditorError> {
        let window = web_sys::window().ok_or_else(|| EditorError::HostBinding("no global window".into()))?;
        let mut listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)> = Vec::with_capacity(3);

        for (name, kind) in [("mousemove", PointerKind::Move), ("mouseup", PointerKind::Up)] {
            let surface = Rc::clone(&surface);
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let pointer = pointer_event_from_mouse(mouse, kind);
                match kind {
                    PointerKind::Move => surface.window_pointer_move(&pointer),
                    PointerKind::Up | PointerKind::Down => surface.window_pointer_up(&pointer),
                }
            });
            window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()).map_err(|e| js_error(&e))?;
            listeners.push((name, closure));
        }

        let keydown = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = key_event_from_keyboard(keyboard);
            surface.key_down(&key);
            if key.default_prevented() {
                event.prevent_default();
            }
        });
        window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref()).map_err(|e| js_error(&e))?;
        listeners.push(("keydown", keydown));

        debug!("web: window listeners attached");
        Ok(Self { window, listeners })
    }
}

impl Drop for WindowListeners {
    fn drop(&mut self) {
        for (name, closure) in &self.listeners {
            if let Err(err) = self.window.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
                warn!(?err, name, "web: failed to detach window listener");
            }
        }
        debug!("web: window listeners detached");
    }
}
