//! Root surface controller.
//!
//! The [`Surface`] is built first. It owns the event hub, the frame
//! scheduler, the focus slot, the shared dimensions and the surface-level
//! shape registry, and hands all of them to controllers as a
//! [`SurfaceContext`]. Hosts feed it window-level pointer and key events and
//! call [`Surface::update`] once per render pass for focus restoration.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::coords::{CoordinateMapper, Dimensions, Padding, SurfaceHost};
use crate::error::EditorError;
use crate::event_hub::{EventHub, HubEvent};
use crate::input::{KeyEvent, PointerEvent};
use crate::registry::ShapeRegistry;
use crate::render::Viewport;
use crate::scheduler::FrameScheduler;
use crate::shape::FocusSlot;

// =============================================================================
// Config
// =============================================================================

/// Surface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Logical plane width.
    pub vector_width: f64,
    /// Logical plane height.
    pub vector_height: f64,
    /// Screen pixels per plane unit.
    pub scale: f64,
    /// Screen-pixel padding around the plane: a number or `{top, right, bottom, left}`.
    pub padding: Padding,
    /// Focus the most recently added shape after an update.
    pub focus_on_add: bool,
    /// Focus the shape nearest to a deleted one after an update.
    pub focus_on_delete: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            vector_width: 0.0,
            vector_height: 0.0,
            scale: 1.0,
            padding: Padding::default(),
            focus_on_add: true,
            focus_on_delete: true,
        }
    }
}

impl SurfaceConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ConfigParse`] for malformed JSON, or any
    /// validation error from [`SurfaceConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`EditorError::InvalidScale`], [`EditorError::InvalidDimensions`]
    /// or [`EditorError::InvalidPadding`] for out-of-range values.
    pub fn validate(&self) -> Result<(), EditorError> {
        validate_dimensions(self.vector_width, self.vector_height, self.scale)?;
        for (side, value) in self.padding.sides() {
            if !value.is_finite() || value < 0.0 {
                return Err(EditorError::InvalidPadding { side, value });
            }
        }
        Ok(())
    }

    fn dimensions(&self) -> Dimensions {
        Dimensions {
            vector_width: self.vector_width,
            vector_height: self.vector_height,
            scale: self.scale,
            padding: self.padding,
        }
    }
}

fn validate_dimensions(width: f64, height: f64, scale: f64) -> Result<(), EditorError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(EditorError::InvalidScale { scale });
    }
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(EditorError::InvalidDimensions { width, height });
    }
    Ok(())
}

// =============================================================================
// Context
// =============================================================================

/// Everything a controller needs from its surface.
#[derive(Clone)]
pub struct SurfaceContext {
    pub hub: Rc<EventHub>,
    pub mapper: CoordinateMapper,
    pub scheduler: Rc<FrameScheduler>,
    pub focus: Rc<FocusSlot>,
    dims: Rc<Cell<Dimensions>>,
    registries: Vec<Rc<ShapeRegistry>>,
}

impl fmt::Debug for SurfaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceContext")
            .field("dims", &self.dims.get())
            .field("registries", &self.registries.len())
            .finish_non_exhaustive()
    }
}

impl SurfaceContext {
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dims.get()
    }

    /// Registries a shape built with this context joins, outermost first.
    #[must_use]
    pub fn registries(&self) -> &[Rc<ShapeRegistry>] {
        &self.registries
    }

    /// A copy of this context whose shapes also join `registry`.
    #[must_use]
    pub fn with_registry(&self, registry: Rc<ShapeRegistry>) -> Self {
        let mut ctx = self.clone();
        ctx.registries.push(registry);
        ctx
    }
}

// =============================================================================
// Surface
// =============================================================================

pub struct Surface {
    config: SurfaceConfig,
    dims: Rc<Cell<Dimensions>>,
    hub: Rc<EventHub>,
    scheduler: Rc<FrameScheduler>,
    focus: Rc<FocusSlot>,
    registry: Rc<ShapeRegistry>,
    mapper: CoordinateMapper,
    mounted: Cell<bool>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("config", &self.config)
            .field("mounted", &self.mounted.get())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Build a surface over `host`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of `config`.
    pub fn new(config: SurfaceConfig, host: Rc<dyn SurfaceHost>) -> Result<Self, EditorError> {
        config.validate()?;
        let dims = Rc::new(Cell::new(config.dimensions()));
        let mapper = CoordinateMapper::new(host, Rc::clone(&dims));
        Ok(Self {
            config,
            dims,
            hub: Rc::new(EventHub::new()),
            scheduler: Rc::new(FrameScheduler::new()),
            focus: Rc::new(FocusSlot::new()),
            registry: Rc::new(ShapeRegistry::new()),
            mapper,
            mounted: Cell::new(false),
        })
    }

    /// Start forwarding window events. Shapes registered from now on count
    /// as added for focus restoration; shapes registered before do not.
    pub fn mount(&self) {
        self.mounted.set(true);
        self.registry.set_track_additions(true);
        debug!(shapes = self.registry.len(), "surface: mounted");
    }

    pub fn unmount(&self) {
        self.mounted.set(false);
        self.registry.set_track_additions(false);
        debug!("surface: unmounted");
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    #[must_use]
    pub fn context(&self) -> SurfaceContext {
        SurfaceContext {
            hub: Rc::clone(&self.hub),
            mapper: self.mapper.clone(),
            scheduler: Rc::clone(&self.scheduler),
            focus: Rc::clone(&self.focus),
            dims: Rc::clone(&self.dims),
            registries: vec![Rc::clone(&self.registry)],
        }
    }

    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dims.get()
    }

    #[must_use]
    pub fn registry(&self) -> &Rc<ShapeRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn hub(&self) -> &Rc<EventHub> {
        &self.hub
    }

    /// Change the plane size and scale, e.g. once a background image has
    /// loaded and its natural size is known.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidScale`] or [`EditorError::InvalidDimensions`].
    pub fn set_dimensions(&mut self, vector_width: f64, vector_height: f64, scale: f64) -> Result<(), EditorError> {
        validate_dimensions(vector_width, vector_height, scale)?;
        self.config.vector_width = vector_width;
        self.config.vector_height = vector_height;
        self.config.scale = scale;
        self.dims.set(self.config.dimensions());
        debug!(vector_width, vector_height, scale, "surface: dimensions changed");
        Ok(())
    }

    /// Pixel size and viewBox for the surface element.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::from_dimensions(&self.dims.get())
    }

    // -------------------------------------------------------------------------
    // Window events
    // -------------------------------------------------------------------------

    pub fn window_pointer_move(&self, event: &PointerEvent) {
        self.forward_pointer(event);
    }

    pub fn window_pointer_up(&self, event: &PointerEvent) {
        self.forward_pointer(event);
    }

    fn forward_pointer(&self, event: &PointerEvent) {
        if !self.mounted.get() {
            trace!(kind = ?event.kind, "surface: pointer event before mount ignored");
            return;
        }
        self.hub.publish(&HubEvent::Pointer(*event));
    }

    /// Key-down: the focused shape sees it first, then every window-level
    /// listener (gesture cancellation).
    pub fn key_down(&self, event: &KeyEvent) {
        if let Some(focused) = self.focus.focused() {
            focused.key_down(event);
        }
        if self.mounted.get() {
            self.hub.publish(&HubEvent::Key(event.clone()));
        }
    }

    /// Run queued frame and deferred tasks. Call from the host's frame tick.
    pub fn flush_frame(&self) -> usize {
        self.scheduler.flush()
    }

    // -------------------------------------------------------------------------
    // Focus restoration
    // -------------------------------------------------------------------------

    /// Restore focus after shapes were added or deleted. Call once after the
    /// application has applied a batch of changes.
    pub fn update(&self) {
        let added = self.registry.take_added();
        let deleted = self.registry.take_last_deleted();

        if self.config.focus_on_add {
            if let Some(newest) = added.iter().rev().find(|h| self.registry.contains(h.id())) {
                debug!(id = %newest.id(), "surface: focusing added shape");
                newest.force_focus();
                return;
            }
        }

        if !self.config.focus_on_delete {
            return;
        }
        let Some(deleted) = deleted else {
            return;
        };
        let target = deleted.center();
        let mut closest = None;
        let mut closest_distance = f64::INFINITY;
        for handle in self.registry.handles() {
            let distance = handle.rect().center().distance_sq(target);
            if distance < closest_distance {
                closest_distance = distance;
                closest = Some(handle);
            }
        }
        if let Some(handle) = closest {
            debug!(id = %handle.id(), "surface: focusing shape nearest to deleted one");
            handle.force_focus();
        }
    }
}
