//! Shape interaction controller.
//!
//! DESIGN
//! ======
//! A [`ShapeController`] owns one interactive shape for as long as the
//! application keeps it alive. It is not `Clone`; dropping it unmounts the
//! shape (unregisters it and notifies the hub). Ancestors talk to the shape
//! through cheap [`ShapeHandle`] clones that share the same state, which is
//! also what the controller derefs to.
//!
//! State machine per shape:
//!
//! ```text
//!   Idle ── body pointer-down ──────────▶ DraggingMove
//!   Idle ── handle pointer-down ────────▶ DraggingResize(handle)
//!   Dragging* ── forwarded move ────────▶ Dragging*   (on_intermediate_change)
//!   Dragging* ── forwarded up ──────────▶ Idle        (on_change if the rect differs)
//!   Dragging* ── Escape ────────────────▶ Idle        (on_drag_cancel)
//!   Dragging* ── pointer claimed ───────▶ Idle        (on_drag_cancel)
//! ```
//!
//! While dragging, the displayed rectangle is derived from two corners:
//! `drag_start` (anchor) and `drag_current` (moving). For a move, the moving
//! corner is the top-left and the anchor the far corner; each step recomputes
//! both. Committed geometry only changes when the application pushes new
//! props with [`ShapeHandle::set_rect`] or [`ShapeHandle::set_props`].
//!
//! Live drag frames are reported only through `on_intermediate_change`.
//! `ChildRectChanged` goes out on the hub when committed or simulated
//! geometry changes.
//!
//! Hub listeners installed by a shape hold `Weak` references, so a stale
//! pointer owner or Escape listener never keeps a dropped shape alive.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::consts::DEFAULT_KEYBOARD_TRANSFORM_MULTIPLIER;
use crate::constrain::{Axis, ConstrainMoveArgs, ConstrainResizeArgs, Constraints};
use crate::error::EditorError;
use crate::event_hub::{EventType, HubEvent, Subscription};
use crate::geometry::{Point, Rect, rect_from_corners, scale_into_selection};
use crate::handles::{HandleName, visible_handles};
use crate::input::{Key, KeyEvent, PointerEvent, PointerKind, Propagation};
use crate::render::{HandleRenderProps, ShapeRenderProps};
use crate::scheduler::FrameHandle;
use crate::surface::SurfaceContext;

// =============================================================================
// ShapeId
// =============================================================================

/// Opaque shape key, unique among mounted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ShapeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Props, options, callbacks
// =============================================================================

/// The committed, application-owned props of a shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeProps {
    pub rect: Rect,
    /// Overrides the focus-derived `active` flag when set.
    pub active: Option<bool>,
    pub disabled: bool,
    pub is_in_selection_group: bool,
    /// Free-form application data handed back in every callback.
    pub extra: serde_json::Value,
}

impl ShapeProps {
    #[must_use]
    pub fn at(rect: Rect) -> Self {
        Self { rect, ..Self::default() }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = extra;
        self
    }
}

/// Per-shape configuration that is not application data.
#[derive(Debug, Clone)]
pub struct ShapeOptions {
    /// Plane units per arrow key press.
    pub keyboard_transform_multiplier: f64,
    pub constraints: Constraints,
    /// Internal components (draw preview, selection overlay) skip registries
    /// and mount notifications.
    pub internal: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            keyboard_transform_multiplier: DEFAULT_KEYBOARD_TRANSFORM_MULTIPLIER,
            constraints: Constraints::default(),
            internal: false,
        }
    }
}

impl ShapeOptions {
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.keyboard_transform_multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// # Errors
    ///
    /// Returns [`EditorError::InvalidMultiplier`] for a non-finite multiplier.
    pub fn validate(&self) -> Result<(), EditorError> {
        let multiplier = self.keyboard_transform_multiplier;
        if !multiplier.is_finite() {
            return Err(EditorError::InvalidMultiplier { multiplier });
        }
        Ok(())
    }
}

pub type ChangeFn = Rc<dyn Fn(Rect, &ShapeProps)>;
pub type IntermediateChangeFn = Rc<dyn Fn(Rect)>;
pub type KeyFn = Rc<dyn Fn(&KeyEvent, &ShapeProps)>;
pub type FocusFn = Rc<dyn Fn(&ShapeProps)>;

/// Application callbacks. Every callback defaults to a no-op.
#[derive(Clone)]
pub struct ShapeCallbacks {
    pub on_change: ChangeFn,
    pub on_intermediate_change: IntermediateChangeFn,
    pub on_delete: KeyFn,
    pub on_focus: FocusFn,
    pub on_blur: FocusFn,
    /// Runs before the built-in key handling; calling
    /// [`KeyEvent::prevent_default`] skips it.
    pub on_key_down: KeyFn,
    /// A gesture was canceled with Escape.
    pub on_drag_cancel: FocusFn,
}

impl Default for ShapeCallbacks {
    fn default() -> Self {
        Self {
            on_change: Rc::new(|_, _| {}),
            on_intermediate_change: Rc::new(|_| {}),
            on_delete: Rc::new(|_, _| {}),
            on_focus: Rc::new(|_| {}),
            on_blur: Rc::new(|_| {}),
            on_key_down: Rc::new(|_, _| {}),
            on_drag_cancel: Rc::new(|_| {}),
        }
    }
}

impl fmt::Debug for ShapeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeCallbacks").finish_non_exhaustive()
    }
}

impl ShapeCallbacks {
    #[must_use]
    pub fn on_change(mut self, f: impl Fn(Rect, &ShapeProps) + 'static) -> Self {
        self.on_change = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_intermediate_change(mut self, f: impl Fn(Rect) + 'static) -> Self {
        self.on_intermediate_change = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_delete(mut self, f: impl Fn(&KeyEvent, &ShapeProps) + 'static) -> Self {
        self.on_delete = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_focus(mut self, f: impl Fn(&ShapeProps) + 'static) -> Self {
        self.on_focus = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_blur(mut self, f: impl Fn(&ShapeProps) + 'static) -> Self {
        self.on_blur = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_key_down(mut self, f: impl Fn(&KeyEvent, &ShapeProps) + 'static) -> Self {
        self.on_key_down = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_drag_cancel(mut self, f: impl Fn(&ShapeProps) + 'static) -> Self {
        self.on_drag_cancel = Rc::new(f);
        self
    }
}

// =============================================================================
// Drag state
// =============================================================================

/// Per-shape gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub is_mouse_down: bool,
    /// Anchor corner.
    pub drag_start: Point,
    /// Moving corner.
    pub drag_current: Point,
    /// Grab point relative to the moving corner.
    pub inner_offset: Point,
    pub lock: Option<Axis>,
    pub is_drag_to_move: bool,
    pub handle: Option<HandleName>,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            is_mouse_down: false,
            drag_start: Point::default(),
            drag_current: Point::default(),
            inner_offset: Point::default(),
            lock: None,
            is_drag_to_move: true,
            handle: None,
        }
    }
}

// =============================================================================
// Focus slot
// =============================================================================

/// The single natively focused shape on a surface.
#[derive(Default)]
pub struct FocusSlot {
    current: RefCell<Option<ShapeHandle>>,
}

impl fmt::Debug for FocusSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.current.borrow().as_ref().map(|h| h.id().clone());
        f.debug_struct("FocusSlot").field("focused", &id).finish()
    }
}

impl FocusSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn focused(&self) -> Option<ShapeHandle> {
        self.current.borrow().clone()
    }

    fn replace(&self, handle: ShapeHandle) -> Option<ShapeHandle> {
        self.current.borrow_mut().replace(handle)
    }

    fn release(&self, handle: &ShapeHandle) {
        let mut current = self.current.borrow_mut();
        if current.as_ref().is_some_and(|h| h.same_instance(handle)) {
            *current = None;
        }
    }
}

// =============================================================================
// ShapeHandle
// =============================================================================

struct ShapeInner {
    id: ShapeId,
    ctx: SurfaceContext,
    options: ShapeOptions,
    callbacks: ShapeCallbacks,
    props: RefCell<ShapeProps>,
    drag: Cell<DragState>,
    simulated: Cell<Option<Rect>>,
    native_active: Cell<bool>,
    got_focus_after_click: Cell<bool>,
    pending_frame: Cell<Option<FrameHandle>>,
    escape_sub: Cell<Option<Subscription>>,
}

/// Shared reference to a mounted shape: the action surface ancestors use.
#[derive(Clone)]
pub struct ShapeHandle(Rc<ShapeInner>);

impl fmt::Debug for ShapeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeHandle")
            .field("id", &self.0.id)
            .field("rect", &self.0.props.borrow().rect)
            .field("drag", &self.0.drag.get())
            .finish_non_exhaustive()
    }
}

impl ShapeHandle {
    #[must_use]
    pub fn id(&self) -> &ShapeId {
        &self.0.id
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.0.options.internal
    }

    /// Whether both handles refer to the same controller instance.
    #[must_use]
    pub fn same_instance(&self, other: &ShapeHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Snapshot of the committed props.
    #[must_use]
    pub fn props(&self) -> ShapeProps {
        self.0.props.borrow().clone()
    }

    /// Committed rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.0.props.borrow().rect
    }

    /// What the shape shows right now: the live drag rectangle while a
    /// gesture is active, else the simulated rectangle, else the committed one.
    #[must_use]
    pub fn displayed_rect(&self) -> Rect {
        let drag = self.0.drag.get();
        if drag.is_mouse_down {
            rect_from_corners(drag.drag_start, drag.drag_current)
        } else if let Some(rect) = self.0.simulated.get() {
            rect
        } else {
            self.rect()
        }
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.0.drag.get()
    }

    #[must_use]
    pub fn simulated_rect(&self) -> Option<Rect> {
        self.0.simulated.get()
    }

    #[must_use]
    pub fn is_native_active(&self) -> bool {
        self.0.native_active.get()
    }

    /// Explicit `active` prop, falling back to native focus.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.props.borrow().active.unwrap_or(self.0.native_active.get())
    }

    // -------------------------------------------------------------------------
    // Committed props
    // -------------------------------------------------------------------------

    /// Push a new committed rectangle.
    pub fn set_rect(&self, rect: Rect) {
        let changed = {
            let mut props = self.0.props.borrow_mut();
            let changed = props.rect != rect;
            props.rect = rect;
            changed
        };
        if changed {
            self.notify_rect_changed();
        }
    }

    /// Replace all committed props.
    pub fn set_props(&self, next: ShapeProps) {
        let changed = {
            let mut props = self.0.props.borrow_mut();
            let changed = props.rect != next.rect;
            *props = next;
            changed
        };
        if changed {
            self.notify_rect_changed();
        }
    }

    fn notify_rect_changed(&self) {
        self.0.ctx.hub.publish(&HubEvent::ChildRectChanged { id: self.0.id.clone(), internal: self.is_internal() });
    }

    // -------------------------------------------------------------------------
    // Pointer
    // -------------------------------------------------------------------------

    /// Primary-button press on the shape body. Starts a move, or with shift
    /// held, asks the selection to toggle this shape instead.
    pub fn body_pointer_down(&self, event: &PointerEvent) -> Propagation {
        if !event.is_primary_only() || self.0.props.borrow().disabled {
            return Propagation::Continue;
        }

        if event.modifiers.shift {
            trace!(id = %self.0.id, "shape: toggle selection");
            self.0.ctx.hub.publish(&HubEvent::ChildToggleSelection {
                id: self.0.id.clone(),
                internal: self.is_internal(),
                pointer: *event,
            });
            return Propagation::Stop;
        }

        self.0.got_focus_after_click.set(false);

        let plane = match self.0.ctx.mapper.to_plane(event, None) {
            Ok(p) => p,
            Err(err) => {
                warn!(id = %self.0.id, %err, "shape: pointer-down dropped");
                return Propagation::Stop;
            }
        };

        let rect = self.rect();
        self.begin_gesture(DragState {
            is_mouse_down: true,
            drag_start: rect.far_corner(),
            drag_current: rect.origin(),
            inner_offset: Point::new(plane.x - rect.x, plane.y - rect.y),
            lock: None,
            is_drag_to_move: true,
            handle: None,
        });
        debug!(id = %self.0.id, x = rect.x, y = rect.y, "shape: move started");
        Propagation::Stop
    }

    /// Primary-button press on one of the resize handles.
    pub fn handle_pointer_down(&self, name: HandleName, event: &PointerEvent) -> Propagation {
        if !event.is_primary_only() || self.0.props.borrow().disabled {
            return Propagation::Continue;
        }

        let plane = match self.0.ctx.mapper.to_plane(event, None) {
            Ok(p) => p,
            Err(err) => {
                warn!(id = %self.0.id, %err, "shape: handle pointer-down dropped");
                return Propagation::Stop;
            }
        };

        let sides = self.displayed_rect();
        let corner = name.moving_corner();
        let moving = corner.of(&sides);
        self.begin_gesture(DragState {
            is_mouse_down: true,
            drag_start: corner.opposite().of(&sides),
            drag_current: moving,
            inner_offset: Point::new(plane.x - moving.x, plane.y - moving.y),
            lock: name.lock(),
            is_drag_to_move: false,
            handle: Some(name),
        });
        debug!(id = %self.0.id, handle = name.as_str(), "shape: resize started");
        Propagation::Stop
    }

    fn begin_gesture(&self, drag: DragState) {
        // A real drag supersedes any simulated transform.
        if let Some(frame) = self.0.pending_frame.take() {
            self.0.ctx.scheduler.cancel(frame);
        }
        self.0.simulated.set(None);

        self.claim_pointer();
        self.0.drag.set(drag);
        self.watch_escape();
    }

    fn claim_pointer(&self) {
        let weak = Rc::downgrade(&self.0);
        self.0.ctx.hub.claim_pointer(Rc::new(move |event: &HubEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let shape = ShapeHandle(inner);
            match event {
                HubEvent::Pointer(pointer) => match pointer.kind {
                    PointerKind::Move => shape.drag_to(pointer),
                    PointerKind::Up => shape.end_drag(),
                    PointerKind::Down => {}
                },
                HubEvent::PointerLost => shape.cancel_drag(),
                _ => {}
            }
        }));
    }

    fn watch_escape(&self) {
        self.release_escape();
        let weak = Rc::downgrade(&self.0);
        let sub = self.0.ctx.hub.subscribe(
            EventType::Key,
            Rc::new(move |event: &HubEvent| {
                let HubEvent::Key(key) = event else {
                    return;
                };
                if !key.key.is(Key::ESCAPE) {
                    return;
                }
                if let Some(inner) = weak.upgrade() {
                    ShapeHandle(inner).cancel_drag();
                }
            }),
        );
        self.0.escape_sub.set(Some(sub));
    }

    fn release_escape(&self) {
        if let Some(sub) = self.0.escape_sub.take() {
            self.0.ctx.hub.unsubscribe(sub);
        }
    }

    fn reset_drag(&self) {
        self.0.drag.set(DragState::default());
        self.release_escape();
    }

    fn drag_to(&self, event: &PointerEvent) {
        let mut drag = self.0.drag.get();
        if !drag.is_mouse_down {
            return;
        }

        let raw = match self.0.ctx.mapper.to_plane(event, Some(drag.inner_offset)) {
            Ok(p) => p,
            Err(err) => {
                warn!(id = %self.0.id, %err, "shape: pointer-move dropped");
                return;
            }
        };
        let dims = self.0.ctx.dimensions();
        let constraints = &self.0.options.constraints;

        let next = if drag.is_drag_to_move {
            let Rect { width, height, .. } = self.rect();
            let coords = constraints.apply_move(&ConstrainMoveArgs {
                x: raw.x,
                y: raw.y,
                width,
                height,
                original_x: drag.drag_current.x,
                original_y: drag.drag_current.y,
                vector_width: dims.vector_width,
                vector_height: dims.vector_height,
            });
            drag.drag_current = coords;
            drag.drag_start = coords.offset(width, height);
            Rect::new(coords.x, coords.y, width, height)
        } else {
            let proposed = constraints.apply_resize(&ConstrainResizeArgs {
                original_moving_corner: drag.drag_current,
                start_corner: drag.drag_start,
                moving_corner: raw,
                locked_dimension: drag.lock,
                vector_width: dims.vector_width,
                vector_height: dims.vector_height,
            });
            drag.drag_current = Point::new(
                if drag.lock == Some(Axis::X) { drag.drag_current.x } else { proposed.x },
                if drag.lock == Some(Axis::Y) { drag.drag_current.y } else { proposed.y },
            );
            rect_from_corners(drag.drag_current, drag.drag_start)
        };

        self.0.drag.set(drag);
        trace!(id = %self.0.id, x = next.x, y = next.y, w = next.width, h = next.height, "shape: drag");
        let on_intermediate_change = Rc::clone(&self.0.callbacks.on_intermediate_change);
        on_intermediate_change(next);
    }

    fn end_drag(&self) {
        let drag = self.0.drag.get();
        if !drag.is_mouse_down {
            return;
        }
        self.reset_drag();

        // Pointer-down alone does not focus the shape on every host.
        if !self.0.got_focus_after_click.get() {
            self.force_focus();
        }

        let props = self.props();
        let current = props.rect;
        let next = if drag.is_drag_to_move {
            Rect::new(drag.drag_current.x, drag.drag_current.y, current.width, current.height)
        } else {
            rect_from_corners(drag.drag_start, drag.drag_current)
        };

        if next == current {
            debug!(id = %self.0.id, "shape: drag ended without change");
            return;
        }
        debug!(id = %self.0.id, x = next.x, y = next.y, w = next.width, h = next.height, "shape: drag committed");
        let on_change = Rc::clone(&self.0.callbacks.on_change);
        on_change(next, &props);
    }

    fn cancel_drag(&self) {
        if !self.0.drag.get().is_mouse_down {
            return;
        }
        self.reset_drag();
        debug!(id = %self.0.id, "shape: drag canceled");

        let on_drag_cancel = Rc::clone(&self.0.callbacks.on_drag_cancel);
        on_drag_cancel(&self.props());
    }

    // -------------------------------------------------------------------------
    // Keyboard
    // -------------------------------------------------------------------------

    /// Key-down while this shape has focus. Ignored mid-gesture.
    pub fn key_down(&self, event: &KeyEvent) {
        if self.0.drag.get().is_mouse_down || !self.0.native_active.get() {
            return;
        }
        let props = self.props();
        if props.disabled {
            return;
        }

        let on_key_down = Rc::clone(&self.0.callbacks.on_key_down);
        on_key_down(event, &props);
        if event.default_prevented() {
            return;
        }

        let handled = if event.key.is_delete() {
            debug!(id = %self.0.id, "shape: delete requested");
            let on_delete = Rc::clone(&self.0.callbacks.on_delete);
            on_delete(event, &props);
            true
        } else if let Some((dx, dy)) = event.key.arrow_delta() {
            let next = if event.modifiers.shift {
                self.keyboard_resize(&props.rect, dx, dy)
            } else {
                self.keyboard_move(&props.rect, dx, dy)
            };
            debug!(id = %self.0.id, key = %event.key.0, x = next.x, y = next.y, w = next.width, h = next.height, "shape: keyboard transform");
            let on_change = Rc::clone(&self.0.callbacks.on_change);
            on_change(next, &props);
            true
        } else {
            false
        };

        if handled {
            event.prevent_default();
        }
    }

    fn keyboard_move(&self, rect: &Rect, dx: f64, dy: f64) -> Rect {
        let m = self.0.options.keyboard_transform_multiplier;
        let dims = self.0.ctx.dimensions();
        let next = self.0.options.constraints.apply_move(&ConstrainMoveArgs {
            x: rect.x + dx * m,
            y: rect.y + dy * m,
            width: rect.width,
            height: rect.height,
            original_x: rect.x,
            original_y: rect.y,
            vector_width: dims.vector_width,
            vector_height: dims.vector_height,
        });
        Rect::new(next.x, next.y, rect.width, rect.height)
    }

    fn keyboard_resize(&self, rect: &Rect, dx: f64, dy: f64) -> Rect {
        let m = self.0.options.keyboard_transform_multiplier;
        let dims = self.0.ctx.dimensions();
        let far = rect.far_corner();
        let next = self.0.options.constraints.apply_resize(&ConstrainResizeArgs {
            original_moving_corner: far,
            start_corner: rect.origin(),
            moving_corner: far.offset(dx * m, dy * m),
            locked_dimension: None,
            vector_width: dims.vector_width,
            vector_height: dims.vector_height,
        });
        rect_from_corners(rect.origin(), next)
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    /// Native focus arrived. Blurs whichever shape held focus before.
    pub fn handle_focus(&self) {
        if self.0.native_active.get() || self.0.props.borrow().disabled {
            return;
        }
        if let Some(previous) = self.0.ctx.focus.replace(self.clone()) {
            if !previous.same_instance(self) {
                previous.handle_blur();
            }
        }

        self.0.got_focus_after_click.set(true);
        self.0.ctx.hub.publish(&HubEvent::ChildFocus { id: self.0.id.clone(), internal: self.is_internal() });
        self.0.native_active.set(true);
        debug!(id = %self.0.id, "shape: focused");

        let on_focus = Rc::clone(&self.0.callbacks.on_focus);
        on_focus(&self.props());
    }

    /// Native focus left.
    pub fn handle_blur(&self) {
        if !self.0.native_active.get() {
            return;
        }
        self.0.native_active.set(false);
        self.0.ctx.focus.release(self);
        debug!(id = %self.0.id, "shape: blurred");

        let on_blur = Rc::clone(&self.0.callbacks.on_blur);
        on_blur(&self.props());
    }

    /// Focus the shape unless it already has native focus.
    pub fn force_focus(&self) {
        if !self.0.native_active.get() {
            self.handle_focus();
        }
    }

    // -------------------------------------------------------------------------
    // Group transforms
    // -------------------------------------------------------------------------

    /// Show `rect` instead of the committed rectangle from the next frame on,
    /// without committing it. Each call replaces the pending frame. `None`
    /// clears the simulation and any drag state right away.
    pub fn simulate_transform(&self, rect: Option<Rect>) {
        if let Some(frame) = self.0.pending_frame.take() {
            self.0.ctx.scheduler.cancel(frame);
        }

        let Some(rect) = rect else {
            self.reset_drag();
            if self.0.simulated.take().is_some() {
                self.notify_rect_changed();
            }
            return;
        };

        let weak = Rc::downgrade(&self.0);
        let frame = self.0.ctx.scheduler.request_frame(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending_frame.set(None);
            inner.simulated.set(Some(rect));
            ShapeHandle(inner).notify_rect_changed();
        });
        self.0.pending_frame.set(Some(frame));
    }

    /// This shape's rectangle after its group's bounding box moves from
    /// `start` to `end`, passed through the shape's own constraints.
    #[must_use]
    pub fn selection_child_updated_rect(&self, start: &Rect, end: &Rect) -> Rect {
        let child = self.rect();
        let adjusted = scale_into_selection(start, end, &child);
        let dims = self.0.ctx.dimensions();
        let constraints = &self.0.options.constraints;

        let origin = constraints.apply_move(&ConstrainMoveArgs {
            x: adjusted.x,
            y: adjusted.y,
            width: adjusted.width,
            height: adjusted.height,
            original_x: child.x,
            original_y: child.y,
            vector_width: dims.vector_width,
            vector_height: dims.vector_height,
        });
        let far = constraints.apply_resize(&ConstrainResizeArgs {
            original_moving_corner: origin.offset(child.width, child.height),
            start_corner: origin,
            moving_corner: origin.offset(adjusted.width, adjusted.height),
            locked_dimension: None,
            vector_width: dims.vector_width,
            vector_height: dims.vector_height,
        });
        rect_from_corners(origin, far)
    }

    // -------------------------------------------------------------------------
    // Render props
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn render_props(&self) -> ShapeRenderProps {
        let props = self.props();
        let native_active = self.0.native_active.get();
        ShapeRenderProps {
            shape_id: self.0.id.clone(),
            rect: self.displayed_rect(),
            scale: self.0.ctx.dimensions().scale,
            active: props.active.unwrap_or(native_active),
            native_active,
            is_being_changed: self.0.drag.get().is_mouse_down || self.0.simulated.get().is_some(),
            is_in_selection_group: props.is_in_selection_group,
            disabled: props.disabled,
            is_internal_component: self.is_internal(),
            extra: props.extra,
        }
    }

    /// Visible resize handles. Disabled shapes have none.
    #[must_use]
    pub fn handles(&self) -> Vec<HandleRenderProps> {
        let props = self.0.props.borrow();
        if props.disabled {
            return Vec::new();
        }
        let native_active = self.0.native_active.get();
        let active = props.active.unwrap_or(native_active);
        let is_in_selection_group = props.is_in_selection_group;
        drop(props);

        let rect = self.displayed_rect();
        let scale = self.0.ctx.dimensions().scale;
        let is_being_changed = self.0.drag.get().is_mouse_down || self.0.simulated.get().is_some();
        visible_handles(rect.width, rect.height, scale)
            .into_iter()
            .map(|h| HandleRenderProps {
                name: h.name,
                cursor: h.cursor,
                x: h.x,
                y: h.y,
                recommended_size: h.recommended_size,
                scale,
                active,
                native_active,
                is_being_changed,
                is_in_selection_group,
            })
            .collect()
    }
}

// =============================================================================
// ShapeController
// =============================================================================

/// Owner of a mounted shape. Dropping it unmounts the shape.
pub struct ShapeController {
    handle: ShapeHandle,
}

impl fmt::Debug for ShapeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShapeController").field(&self.handle).finish()
    }
}

impl Deref for ShapeController {
    type Target = ShapeHandle;

    fn deref(&self) -> &ShapeHandle {
        &self.handle
    }
}

impl ShapeController {
    /// Mount a shape: register it in every registry of `ctx` and announce it
    /// on the hub. Internal shapes do neither.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidMultiplier`] for invalid options.
    pub fn new(
        ctx: &SurfaceContext,
        id: impl Into<ShapeId>,
        props: ShapeProps,
        options: ShapeOptions,
        callbacks: ShapeCallbacks,
    ) -> Result<Self, EditorError> {
        options.validate()?;

        let handle = ShapeHandle(Rc::new(ShapeInner {
            id: id.into(),
            ctx: ctx.clone(),
            options,
            callbacks,
            props: RefCell::new(props),
            drag: Cell::new(DragState::default()),
            simulated: Cell::new(None),
            native_active: Cell::new(false),
            got_focus_after_click: Cell::new(true),
            pending_frame: Cell::new(None),
            escape_sub: Cell::new(None),
        }));

        if !handle.is_internal() {
            for registry in ctx.registries() {
                registry.register(handle.clone());
            }
            ctx.hub.publish(&HubEvent::MountedOrUnmounted { handle: handle.clone(), mounted: true });
        }
        handle.notify_rect_changed();
        debug!(id = %handle.id(), internal = handle.is_internal(), "shape: mounted");

        Ok(Self { handle })
    }

    /// A cloneable handle to this shape.
    #[must_use]
    pub fn handle(&self) -> ShapeHandle {
        self.handle.clone()
    }
}

impl Drop for ShapeController {
    fn drop(&mut self) {
        let inner = &self.handle.0;
        if let Some(frame) = inner.pending_frame.take() {
            inner.ctx.scheduler.cancel(frame);
        }
        self.handle.release_escape();
        inner.ctx.focus.release(&self.handle);

        if !self.handle.is_internal() {
            for registry in inner.ctx.registries() {
                registry.unregister(&self.handle);
            }
            inner.ctx.hub.publish(&HubEvent::MountedOrUnmounted { handle: self.handle.clone(), mounted: false });
        }
        debug!(id = %inner.id, "shape: unmounted");
    }
}
