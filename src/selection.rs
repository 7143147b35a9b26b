//! Selection controller: marquee, click toggling and group transforms.
//!
//! DESIGN
//! ======
//! The selection set belongs to the application. The controller keeps the
//! last value pushed with [`SelectionController::set_selected_ids`] and only
//! ever proposes changes through `on_selection_change`.
//!
//! Shapes built with [`SelectionController::child_context`] join the
//! selection's own registry, which is what the marquee and the overlay read.
//! When two or more registered shapes are selected, an internal overlay shape
//! covers their union bounding box. Dragging, resizing or nudging the overlay
//! re-projects every member: intermediate frames go to each member's
//! `simulate_transform`, the commit clears those simulations and reports all
//! member rectangles in one `on_change`.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::consts::{DEFAULT_KEYBOARD_TRANSFORM_MULTIPLIER, DEFAULT_MIN_SELECTION_DISTANCE, SELECTION_OVERLAY_ID, SELECTION_PREVIEW_ID};
use crate::constrain::Constraints;
use crate::error::EditorError;
use crate::event_hub::{EventType, HubEvent, Subscription};
use crate::geometry::{Point, Rect, rect_from_corners, union_bounds};
use crate::input::{Key, KeyEvent, PointerEvent, PointerKind, Propagation};
use crate::registry::ShapeRegistry;
use crate::render::PreviewRenderProps;
use crate::shape::{ShapeCallbacks, ShapeController, ShapeHandle, ShapeId, ShapeOptions, ShapeProps};
use crate::surface::SurfaceContext;

/// Selection layer configuration.
#[derive(Debug, Clone)]
pub struct SelectionOptions {
    /// Marquee extent (plane units, either axis) before a preview is shown.
    pub minimum_distance_for_selection: f64,
    /// Arrow-key step of the group overlay.
    pub keyboard_transform_multiplier: f64,
    /// Constraints applied to the overlay rectangle itself.
    pub overlay_constraints: Constraints,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            minimum_distance_for_selection: DEFAULT_MIN_SELECTION_DISTANCE,
            keyboard_transform_multiplier: DEFAULT_KEYBOARD_TRANSFORM_MULTIPLIER,
            overlay_constraints: Constraints::default(),
        }
    }
}

pub type SelectionChangeFn = Rc<dyn Fn(&[ShapeId])>;
pub type GroupChangeFn = Rc<dyn Fn(&[Rect], &[ShapeProps])>;
pub type GroupDeleteFn = Rc<dyn Fn(&KeyEvent, &[ShapeProps])>;

#[derive(Clone)]
pub struct SelectionCallbacks {
    pub on_selection_change: SelectionChangeFn,
    /// New member rectangles, parallel to the members' props.
    pub on_change: GroupChangeFn,
    pub on_delete: GroupDeleteFn,
}

impl fmt::Debug for SelectionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionCallbacks").finish_non_exhaustive()
    }
}

impl SelectionCallbacks {
    pub fn new(on_selection_change: impl Fn(&[ShapeId]) + 'static) -> Self {
        Self {
            on_selection_change: Rc::new(on_selection_change),
            on_change: Rc::new(|_, _| {}),
            on_delete: Rc::new(|_, _| {}),
        }
    }

    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&[Rect], &[ShapeProps]) + 'static) -> Self {
        self.on_change = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_delete(mut self, f: impl Fn(&KeyEvent, &[ShapeProps]) + 'static) -> Self {
        self.on_delete = Rc::new(f);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MarqueeState {
    is_mouse_down: bool,
    start: Point,
    current: Point,
}

struct SelectionInner {
    ctx: SurfaceContext,
    registry: Rc<ShapeRegistry>,
    options: SelectionOptions,
    callbacks: SelectionCallbacks,
    selected: RefCell<Vec<ShapeId>>,
    marquee: Cell<MarqueeState>,
    overlay: RefCell<Option<ShapeController>>,
    escape_sub: Cell<Option<Subscription>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

pub struct SelectionController {
    inner: Rc<SelectionInner>,
}

impl fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionController")
            .field("selected", &self.inner.selected.borrow())
            .field("marquee", &self.inner.marquee.get())
            .field("overlay", &self.inner.overlay.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl SelectionController {
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidMultiplier`] for a non-finite overlay
    /// keyboard multiplier.
    pub fn new(ctx: &SurfaceContext, options: SelectionOptions, callbacks: SelectionCallbacks) -> Result<Self, EditorError> {
        let multiplier = options.keyboard_transform_multiplier;
        if !multiplier.is_finite() {
            return Err(EditorError::InvalidMultiplier { multiplier });
        }

        let inner = Rc::new(SelectionInner {
            ctx: ctx.clone(),
            registry: Rc::new(ShapeRegistry::new()),
            options,
            callbacks,
            selected: RefCell::new(Vec::new()),
            marquee: Cell::new(MarqueeState::default()),
            overlay: RefCell::new(None),
            escape_sub: Cell::new(None),
            subscriptions: RefCell::new(Vec::new()),
        });
        inner.subscribe_hub();
        Ok(Self { inner })
    }

    /// Context for shapes inside this selection layer.
    #[must_use]
    pub fn child_context(&self) -> SurfaceContext {
        self.inner.ctx.with_registry(Rc::clone(&self.inner.registry))
    }

    #[must_use]
    pub fn registry(&self) -> &Rc<ShapeRegistry> {
        &self.inner.registry
    }

    /// Push the application's current selection.
    pub fn set_selected_ids(&self, ids: Vec<ShapeId>) {
        trace!(?ids, "selection: ids pushed");
        *self.inner.selected.borrow_mut() = ids;
        self.inner.sync_overlay();
    }

    #[must_use]
    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.inner.selected.borrow().clone()
    }

    /// Primary press on the selection layer's backing rectangle: start a
    /// marquee and clear the selection.
    pub fn backing_pointer_down(&self, event: &PointerEvent) -> Propagation {
        if !event.is_primary_only() {
            return Propagation::Continue;
        }
        let inner = &self.inner;
        let start = match inner.ctx.mapper.to_plane(event, None) {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "selection: pointer-down dropped");
                return Propagation::Stop;
            }
        };

        let weak = Rc::downgrade(inner);
        inner.ctx.hub.claim_pointer(Rc::new(move |event: &HubEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match event {
                HubEvent::Pointer(pointer) => match pointer.kind {
                    PointerKind::Move => inner.marquee_to(pointer),
                    PointerKind::Up => inner.finish_marquee(),
                    PointerKind::Down => {}
                },
                HubEvent::PointerLost if inner.marquee.get().is_mouse_down => {
                    debug!("selection: pointer taken, marquee canceled");
                    inner.reset_marquee();
                }
                _ => {}
            }
        }));
        inner.marquee.set(MarqueeState { is_mouse_down: true, start, current: start });
        inner.watch_escape();
        debug!(x = start.x, y = start.y, "selection: marquee started");

        inner.clear_selection();
        Propagation::Stop
    }

    /// Primary press anywhere in the selection layer that no shape consumed
    /// (e.g. a draw layer stacked on top): clear the selection.
    pub fn layer_pointer_down(&self, event: &PointerEvent) -> Propagation {
        if event.is_primary_only() {
            self.inner.clear_selection();
        }
        Propagation::Continue
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.inner.marquee.get().is_mouse_down
    }

    /// Marquee preview, once it has grown past the minimum distance.
    #[must_use]
    pub fn marquee_preview(&self) -> Option<PreviewRenderProps> {
        let state = self.inner.marquee.get();
        if !state.is_mouse_down {
            return None;
        }
        let rect = rect_from_corners(state.start, state.current);
        let min = self.inner.options.minimum_distance_for_selection;
        (rect.width >= min || rect.height >= min)
            .then(|| PreviewRenderProps::new(SELECTION_PREVIEW_ID, rect, self.inner.ctx.dimensions().scale))
    }

    /// The group overlay shape, present while two or more registered shapes
    /// are selected.
    #[must_use]
    pub fn overlay(&self) -> Option<ShapeHandle> {
        self.inner.overlay.borrow().as_ref().map(ShapeController::handle)
    }

    /// The padded plane, which the selection layer's backing rectangle covers.
    #[must_use]
    pub fn backing_rect(&self) -> Rect {
        self.inner.ctx.dimensions().backing_rect()
    }
}

impl Drop for SelectionController {
    fn drop(&mut self) {
        self.inner.release_escape();
        for sub in self.inner.subscriptions.borrow_mut().drain(..) {
            self.inner.ctx.hub.unsubscribe(sub);
        }
        let overlay = self.inner.overlay.borrow_mut().take();
        drop(overlay);
    }
}

impl SelectionInner {
    fn subscribe_hub(self: &Rc<Self>) {
        let mut subs = Vec::with_capacity(4);
        for event_type in [
            EventType::MountedOrUnmounted,
            EventType::ChildToggleSelection,
            EventType::ChildRectChanged,
            EventType::ChildFocus,
        ] {
            let weak = Rc::downgrade(self);
            subs.push(self.ctx.hub.subscribe(
                event_type,
                Rc::new(move |event: &HubEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_hub_event(event);
                    }
                }),
            ));
        }
        *self.subscriptions.borrow_mut() = subs;
    }

    fn on_hub_event(self: &Rc<Self>, event: &HubEvent) {
        match event {
            HubEvent::MountedOrUnmounted { handle, .. } => {
                if self.is_selected(handle.id()) {
                    self.sync_overlay();
                }
            }
            HubEvent::ChildRectChanged { id, internal } => {
                if !internal && self.is_selected(id) {
                    self.sync_overlay();
                }
            }
            HubEvent::ChildFocus { id, internal } => {
                if !internal {
                    self.child_focused(id);
                }
            }
            HubEvent::ChildToggleSelection { id, internal, pointer } => {
                self.toggle(id, *internal, pointer);
            }
            HubEvent::Pointer(_) | HubEvent::PointerLost | HubEvent::Key(_) => {}
        }
    }

    fn is_selected(&self, id: &ShapeId) -> bool {
        self.selected.borrow().contains(id)
    }

    fn propose(&self, ids: &[ShapeId]) {
        debug!(?ids, "selection: change proposed");
        let on_selection_change = Rc::clone(&self.callbacks.on_selection_change);
        on_selection_change(ids);
    }

    fn clear_selection(&self) {
        if !self.selected.borrow().is_empty() {
            self.propose(&[]);
        }
    }

    // -------------------------------------------------------------------------
    // Marquee
    // -------------------------------------------------------------------------

    fn watch_escape(self: &Rc<Self>) {
        self.release_escape();
        let weak = Rc::downgrade(self);
        let sub = self.ctx.hub.subscribe(
            EventType::Key,
            Rc::new(move |event: &HubEvent| {
                let HubEvent::Key(key) = event else {
                    return;
                };
                if !key.key.is(Key::ESCAPE) {
                    return;
                }
                if let Some(inner) = weak.upgrade() {
                    if inner.marquee.get().is_mouse_down {
                        debug!("selection: marquee canceled");
                        inner.reset_marquee();
                    }
                }
            }),
        );
        self.escape_sub.set(Some(sub));
    }

    fn release_escape(&self) {
        if let Some(sub) = self.escape_sub.take() {
            self.ctx.hub.unsubscribe(sub);
        }
    }

    fn reset_marquee(&self) -> MarqueeState {
        self.release_escape();
        self.marquee.replace(MarqueeState::default())
    }

    fn marquee_to(&self, event: &PointerEvent) {
        let mut state = self.marquee.get();
        if !state.is_mouse_down {
            return;
        }
        match self.ctx.mapper.to_plane(event, None) {
            Ok(p) => state.current = p,
            Err(err) => {
                warn!(%err, "selection: pointer-move dropped");
                return;
            }
        }
        self.marquee.set(state);
    }

    fn finish_marquee(self: &Rc<Self>) {
        if !self.marquee.get().is_mouse_down {
            return;
        }
        let state = self.reset_marquee();
        let area = rect_from_corners(state.start, state.current);
        let hits: Vec<ShapeHandle> = self.registry.handles().into_iter().filter(|h| h.rect().overlaps(&area)).collect();
        let ids: Vec<ShapeId> = hits.iter().map(|h| h.id().clone()).collect();
        debug!(count = ids.len(), "selection: marquee released");

        self.propose(&ids);
        match hits.as_slice() {
            [only] => only.force_focus(),
            [_, _, ..] => self.focus_overlay(),
            [] => {}
        }
    }

    // -------------------------------------------------------------------------
    // Click bookkeeping
    // -------------------------------------------------------------------------

    fn child_focused(&self, id: &ShapeId) {
        let already_sole = {
            let selected = self.selected.borrow();
            selected.len() == 1 && selected[0] == *id
        };
        if !already_sole {
            self.propose(std::slice::from_ref(id));
        }
    }

    fn toggle(self: &Rc<Self>, id: &ShapeId, internal: bool, pointer: &PointerEvent) {
        let is_overlay = id.as_str() == SELECTION_OVERLAY_ID;
        if internal && !is_overlay {
            return;
        }
        let target = if is_overlay {
            match self.shape_under(pointer) {
                Some(target) => target,
                None => {
                    trace!("selection: overlay click with no shape beneath");
                    return;
                }
            }
        } else {
            id.clone()
        };

        let selected = self.selected.borrow().clone();
        if !selected.contains(&target) {
            let mut next = selected;
            next.push(target);
            self.propose(&next);
            if next.len() >= 2 {
                self.focus_overlay();
            }
        } else if selected.len() >= 2 {
            let next: Vec<ShapeId> = selected.into_iter().filter(|s| *s != target).collect();
            self.propose(&next);
        }
    }

    /// The shape under a click that landed on the overlay. Asks the host
    /// first, then falls back to the topmost registered shape containing the
    /// point.
    fn shape_under(&self, pointer: &PointerEvent) -> Option<ShapeId> {
        let from_host = self
            .ctx
            .mapper
            .host()
            .shape_ids_at(pointer.client)
            .into_iter()
            .find(|id| id.as_str() != SELECTION_OVERLAY_ID);
        if from_host.is_some() {
            return from_host;
        }

        let plane = match self.ctx.mapper.to_plane(pointer, None) {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "selection: overlay hit-test dropped");
                return None;
            }
        };
        self.registry.handles().into_iter().rev().find(|h| h.rect().contains(plane)).map(|h| h.id().clone())
    }

    // -------------------------------------------------------------------------
    // Overlay
    // -------------------------------------------------------------------------

    fn members(&self) -> Vec<ShapeHandle> {
        let selected = self.selected.borrow();
        selected.iter().filter_map(|id| self.registry.get(id)).collect()
    }

    fn focus_overlay(self: &Rc<Self>) {
        let overlay = self.overlay.borrow().as_ref().map(ShapeController::handle);
        if let Some(overlay) = overlay {
            overlay.force_focus();
            return;
        }
        // The application may not have pushed the new selection yet.
        let weak = Rc::downgrade(self);
        self.ctx.scheduler.defer(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let overlay = inner.overlay.borrow().as_ref().map(ShapeController::handle);
            if let Some(overlay) = overlay {
                overlay.force_focus();
            }
        });
    }

    fn sync_overlay(self: &Rc<Self>) {
        let rects: Vec<Rect> = self.members().iter().map(ShapeHandle::rect).collect();
        let bounds = if rects.len() >= 2 { union_bounds(&rects) } else { None };

        let Some(bounds) = bounds else {
            let stale = self.overlay.borrow_mut().take();
            if stale.is_some() {
                debug!("selection: overlay removed");
            }
            drop(stale);
            return;
        };

        let existing = self.overlay.borrow().as_ref().map(ShapeController::handle);
        if let Some(overlay) = existing {
            overlay.set_rect(bounds);
            return;
        }

        match self.build_overlay(bounds) {
            Ok(overlay) => {
                debug!(x = bounds.x, y = bounds.y, w = bounds.width, h = bounds.height, "selection: overlay created");
                *self.overlay.borrow_mut() = Some(overlay);
            }
            Err(err) => warn!(%err, "selection: overlay not created"),
        }
    }

    fn build_overlay(self: &Rc<Self>, bounds: Rect) -> Result<ShapeController, EditorError> {
        let on_intermediate = Rc::downgrade(self);
        let on_change = Rc::downgrade(self);
        let on_delete = Rc::downgrade(self);
        let on_cancel = Rc::downgrade(self);
        let callbacks = ShapeCallbacks::default()
            .on_intermediate_change(move |rect| with_inner(&on_intermediate, |inner| inner.preview_group(rect)))
            .on_change(move |rect, _| with_inner(&on_change, |inner| inner.commit_group(rect)))
            .on_delete(move |event, _| with_inner(&on_delete, |inner| inner.delete_group(event)))
            .on_drag_cancel(move |_| with_inner(&on_cancel, SelectionInner::cancel_group));
        let options = ShapeOptions::default()
            .internal()
            .with_multiplier(self.options.keyboard_transform_multiplier)
            .with_constraints(self.options.overlay_constraints.clone());

        ShapeController::new(&self.ctx, SELECTION_OVERLAY_ID, ShapeProps::at(bounds), options, callbacks)
    }

    fn overlay_rect(&self) -> Option<Rect> {
        self.overlay.borrow().as_ref().map(|o| o.rect())
    }

    fn preview_group(&self, next: Rect) {
        let Some(start) = self.overlay_rect() else {
            return;
        };
        for member in self.members() {
            let rect = member.selection_child_updated_rect(&start, &next);
            member.simulate_transform(Some(rect));
        }
    }

    fn commit_group(&self, next: Rect) {
        let Some(start) = self.overlay_rect() else {
            return;
        };
        let members = self.members();
        let rects: Vec<Rect> = members.iter().map(|m| m.selection_child_updated_rect(&start, &next)).collect();
        for member in &members {
            member.simulate_transform(None);
        }
        let props: Vec<ShapeProps> = members.iter().map(ShapeHandle::props).collect();
        debug!(members = members.len(), "selection: group change committed");

        let on_change = Rc::clone(&self.callbacks.on_change);
        on_change(&rects, &props);
    }

    fn cancel_group(&self) {
        for member in self.members() {
            member.simulate_transform(None);
        }
        debug!("selection: group transform canceled");
    }

    fn delete_group(&self, event: &KeyEvent) {
        let props: Vec<ShapeProps> = self.members().iter().map(ShapeHandle::props).collect();
        debug!(members = props.len(), "selection: group delete requested");
        let on_delete = Rc::clone(&self.callbacks.on_delete);
        on_delete(event, &props);
    }
}

fn with_inner(weak: &Weak<SelectionInner>, f: impl FnOnce(&SelectionInner)) {
    if let Some(inner) = weak.upgrade() {
        f(&inner);
    }
}
