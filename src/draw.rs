//! Drag-to-create controller.
//!
//! `Idle -> Drawing -> Idle`. A primary press on the draw layer's backing
//! rectangle anchors a zero-size rectangle at the move-constrained start
//! point; forwarded moves drag the opposite corner through the resize
//! constraint; release reports the rectangle unless it is empty on either
//! axis. Escape cancels.

#[cfg(test)]
#[path = "draw_test.rs"]
mod draw_test;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::consts::DRAW_PREVIEW_ID;
use crate::constrain::{ConstrainMoveArgs, ConstrainResizeArgs, Constraints};
use crate::event_hub::{EventType, HubEvent, Subscription};
use crate::geometry::{Point, Rect, rect_from_corners};
use crate::input::{Key, PointerEvent, PointerKind, Propagation};
use crate::render::PreviewRenderProps;
use crate::surface::SurfaceContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStart {
    pub start_corner: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawProgress {
    pub start_corner: Point,
    pub moving_corner: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawEnd {
    pub start_corner: Point,
    pub moving_corner: Point,
    pub canceled: bool,
}

/// Application callbacks. Everything but `on_add_shape` is optional.
#[derive(Clone)]
pub struct DrawCallbacks {
    pub on_add_shape: Rc<dyn Fn(Rect)>,
    pub on_draw_start: Rc<dyn Fn(&DrawStart)>,
    pub on_draw: Rc<dyn Fn(&DrawProgress)>,
    pub on_draw_end: Rc<dyn Fn(&DrawEnd)>,
}

impl fmt::Debug for DrawCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawCallbacks").finish_non_exhaustive()
    }
}

impl DrawCallbacks {
    pub fn new(on_add_shape: impl Fn(Rect) + 'static) -> Self {
        Self {
            on_add_shape: Rc::new(on_add_shape),
            on_draw_start: Rc::new(|_| {}),
            on_draw: Rc::new(|_| {}),
            on_draw_end: Rc::new(|_| {}),
        }
    }

    #[must_use]
    pub fn on_draw_start(mut self, f: impl Fn(&DrawStart) + 'static) -> Self {
        self.on_draw_start = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_draw(mut self, f: impl Fn(&DrawProgress) + 'static) -> Self {
        self.on_draw = Rc::new(f);
        self
    }

    #[must_use]
    pub fn on_draw_end(mut self, f: impl Fn(&DrawEnd) + 'static) -> Self {
        self.on_draw_end = Rc::new(f);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DrawState {
    is_mouse_down: bool,
    start: Point,
    current: Point,
}

struct DrawInner {
    ctx: SurfaceContext,
    constraints: Constraints,
    callbacks: DrawCallbacks,
    state: Cell<DrawState>,
    escape_sub: Cell<Option<Subscription>>,
}

pub struct DrawController {
    inner: Rc<DrawInner>,
}

impl fmt::Debug for DrawController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawController").field("state", &self.inner.state.get()).finish_non_exhaustive()
    }
}

impl DrawController {
    #[must_use]
    pub fn new(ctx: &SurfaceContext, constraints: Constraints, callbacks: DrawCallbacks) -> Self {
        Self {
            inner: Rc::new(DrawInner {
                ctx: ctx.clone(),
                constraints,
                callbacks,
                state: Cell::new(DrawState::default()),
                escape_sub: Cell::new(None),
            }),
        }
    }

    /// Primary press on the draw layer. Propagation continues so an
    /// enclosing selection layer can clear its selection.
    pub fn surface_pointer_down(&self, event: &PointerEvent) -> Propagation {
        if !event.is_primary_only() {
            return Propagation::Continue;
        }
        let inner = &self.inner;
        let raw = match inner.ctx.mapper.to_plane(event, None) {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "draw: pointer-down dropped");
                return Propagation::Continue;
            }
        };
        let dims = inner.ctx.dimensions();
        let start = inner.constraints.apply_move(&ConstrainMoveArgs {
            x: raw.x,
            y: raw.y,
            width: 0.0,
            height: 0.0,
            original_x: raw.x,
            original_y: raw.y,
            vector_width: dims.vector_width,
            vector_height: dims.vector_height,
        });

        let weak = Rc::downgrade(inner);
        inner.ctx.hub.claim_pointer(Rc::new(move |event: &HubEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match event {
                HubEvent::Pointer(pointer) => match pointer.kind {
                    PointerKind::Move => inner.drag_to(pointer),
                    PointerKind::Up => inner.finish(),
                    PointerKind::Down => {}
                },
                HubEvent::PointerLost if inner.state.get().is_mouse_down => {
                    debug!("draw: pointer taken, canceled");
                    inner.end_and_reset(true);
                }
                _ => {}
            }
        }));
        inner.state.set(DrawState { is_mouse_down: true, start, current: start });
        inner.watch_escape();
        debug!(x = start.x, y = start.y, "draw: started");

        let on_draw_start = Rc::clone(&inner.callbacks.on_draw_start);
        on_draw_start(&DrawStart { start_corner: start });
        Propagation::Continue
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.inner.state.get().is_mouse_down
    }

    /// Preview of the rectangle being drawn.
    #[must_use]
    pub fn preview(&self) -> Option<PreviewRenderProps> {
        let state = self.inner.state.get();
        state.is_mouse_down.then(|| {
            PreviewRenderProps::new(
                DRAW_PREVIEW_ID,
                rect_from_corners(state.start, state.current),
                self.inner.ctx.dimensions().scale,
            )
        })
    }

    /// The padded plane, which the draw layer's backing rectangle covers.
    #[must_use]
    pub fn backing_rect(&self) -> Rect {
        self.inner.ctx.dimensions().backing_rect()
    }
}

impl Drop for DrawController {
    fn drop(&mut self) {
        self.inner.release_escape();
    }
}

impl DrawInner {
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
                    if inner.state.get().is_mouse_down {
                        debug!("draw: canceled");
                        inner.end_and_reset(true);
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

    fn drag_to(&self, event: &PointerEvent) {
        let mut state = self.state.get();
        if !state.is_mouse_down {
            return;
        }
        let raw = match self.ctx.mapper.to_plane(event, None) {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "draw: pointer-move dropped");
                return;
            }
        };
        let dims = self.ctx.dimensions();
        state.current = self.constraints.apply_resize(&ConstrainResizeArgs {
            original_moving_corner: state.current,
            start_corner: state.start,
            moving_corner: raw,
            locked_dimension: None,
            vector_width: dims.vector_width,
            vector_height: dims.vector_height,
        });
        self.state.set(state);
        trace!(x = state.current.x, y = state.current.y, "draw: moved");

        let on_draw = Rc::clone(&self.callbacks.on_draw);
        on_draw(&DrawProgress { start_corner: state.start, moving_corner: state.current });
    }

    fn end_and_reset(&self, canceled: bool) -> DrawState {
        let state = self.state.replace(DrawState::default());
        self.release_escape();
        let on_draw_end = Rc::clone(&self.callbacks.on_draw_end);
        on_draw_end(&DrawEnd { start_corner: state.start, moving_corner: state.current, canceled });
        state
    }

    fn finish(&self) {
        if !self.state.get().is_mouse_down {
            return;
        }
        let state = self.end_and_reset(false);
        if state.start.x == state.current.x || state.start.y == state.current.y {
            debug!("draw: empty rectangle discarded");
            return;
        }
        let rect = rect_from_corners(state.start, state.current);
        debug!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "draw: shape added");
        let on_add_shape = Rc::clone(&self.callbacks.on_add_shape);
        on_add_shape(rect);
    }
}
