//! Explicit registry of mounted shapes.
//!
//! Shapes register themselves in every registry of the context they were
//! built with and unregister when dropped. The surface owns one registry for
//! focus restoration; a selection controller owns a second one for
//! hit-testing its members. Entries keep registration order, which is the
//! iteration order for every tie-break.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::cell::{Cell, RefCell};
use std::fmt;

use tracing::{debug, warn};

use crate::geometry::Rect;
use crate::shape::{ShapeHandle, ShapeId};

#[derive(Default)]
pub struct ShapeRegistry {
    entries: RefCell<Vec<ShapeHandle>>,
    /// When set, registrations are also recorded as "just added".
    track_additions: Cell<bool>,
    added: RefCell<Vec<ShapeHandle>>,
    last_deleted: Cell<Option<Rect>>,
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("ids", &self.ids())
            .field("track_additions", &self.track_additions.get())
            .finish_non_exhaustive()
    }
}

impl ShapeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handle`. A handle whose id is already registered replaces the
    /// old entry in place.
    pub fn register(&self, handle: ShapeHandle) {
        let id = handle.id().clone();
        {
            let mut entries = self.entries.borrow_mut();
            if let Some(slot) = entries.iter_mut().find(|h| h.id() == &id) {
                warn!(%id, "registry: duplicate shape id, replacing entry");
                *slot = handle.clone();
            } else {
                entries.push(handle.clone());
            }
        }
        if self.track_additions.get() {
            self.added.borrow_mut().push(handle);
        }
        debug!(%id, "registry: registered");
    }

    /// Remove `handle`, remembering its last committed rectangle as the most
    /// recent deletion. Entries that belong to a different instance with the
    /// same id are left alone.
    pub fn unregister(&self, handle: &ShapeHandle) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|h| !h.same_instance(handle));
            before != entries.len()
        };
        if !removed {
            return;
        }
        self.added.borrow_mut().retain(|h| !h.same_instance(handle));
        self.last_deleted.set(Some(handle.props().rect));
        debug!(id = %handle.id(), "registry: unregistered");
    }

    /// Start or stop recording registrations as additions.
    pub fn set_track_additions(&self, track: bool) {
        self.track_additions.set(track);
    }

    /// Shapes registered since the last call, oldest first.
    pub fn take_added(&self) -> Vec<ShapeHandle> {
        std::mem::take(&mut *self.added.borrow_mut())
    }

    /// Committed rectangle of the most recently unregistered shape since the
    /// last call.
    pub fn take_last_deleted(&self) -> Option<Rect> {
        self.last_deleted.take()
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<ShapeHandle> {
        self.entries.borrow().iter().find(|h| h.id() == id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.entries.borrow().iter().any(|h| h.id() == id)
    }

    /// Every registered handle, in registration order.
    #[must_use]
    pub fn handles(&self) -> Vec<ShapeHandle> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ShapeId> {
        self.entries.borrow().iter().map(|h| h.id().clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
