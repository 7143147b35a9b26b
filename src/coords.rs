//! Surface dimensions and client-to-plane coordinate conversion.
//!
//! The plane is the editor's logical coordinate space: unscaled and
//! unpadded. The surface element sits somewhere in the host viewport with
//! `padding` pixels around a `vector_width * scale` by `vector_height * scale`
//! drawing area.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EditorError;
use crate::geometry::{Point, Rect};
use crate::input::PointerEvent;
use crate::shape::ShapeId;

/// What the editor needs from the element hosting the surface.
pub trait SurfaceHost {
    /// The surface's live bounding box in client pixels, or `None` when the
    /// element is not mounted. Must not be cached by implementations; the
    /// surface may scroll or resize mid-drag.
    fn bounding_client_rect(&self) -> Option<Rect>;

    /// Shape ids of the elements under `client`, topmost first. Hosts without
    /// a hit-testable scene return nothing and the editor falls back to its
    /// own geometric hit-test.
    fn shape_ids_at(&self, _client: Point) -> Vec<ShapeId> {
        Vec::new()
    }
}

/// A host whose bounding box is set explicitly. Used by native hosts that
/// already know where they draw the surface, and in tests.
#[derive(Debug, Default)]
pub struct StaticSurface {
    rect: Cell<Option<Rect>>,
}

impl StaticSurface {
    /// A surface mounted at `rect`.
    #[must_use]
    pub fn at(rect: Rect) -> Self {
        Self { rect: Cell::new(Some(rect)) }
    }

    /// A surface that has not been mounted yet.
    #[must_use]
    pub fn unmounted() -> Self {
        Self::default()
    }

    pub fn set_rect(&self, rect: Option<Rect>) {
        self.rect.set(rect);
    }
}

impl SurfaceHost for StaticSurface {
    fn bounding_client_rect(&self) -> Option<Rect> {
        self.rect.get()
    }
}

/// Per-side padding around the drawing area.
///
/// Deserializes from either a single number (uniform) or an object with any
/// of `top`, `right`, `bottom`, `left` (missing sides are zero).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// The four sides with their names, in CSS order.
    #[must_use]
    pub fn sides(&self) -> [(&'static str, f64); 4] {
        [("top", self.top), ("right", self.right), ("bottom", self.bottom), ("left", self.left)]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaddingRepr {
    Uniform(f64),
    Sides {
        #[serde(default)]
        top: f64,
        #[serde(default)]
        right: f64,
        #[serde(default)]
        bottom: f64,
        #[serde(default)]
        left: f64,
    },
}

impl<'de> Deserialize<'de> for Padding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PaddingRepr::deserialize(deserializer)? {
            PaddingRepr::Uniform(v) => Padding::uniform(v),
            PaddingRepr::Sides { top, right, bottom, left } => Padding { top, right, bottom, left },
        })
    }
}

/// Shared surface dimensions handed to every controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// Logical width of the plane.
    pub vector_width: f64,
    /// Logical height of the plane.
    pub vector_height: f64,
    /// Screen pixels per plane unit.
    pub scale: f64,
    /// Padding in screen pixels.
    pub padding: Padding,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { vector_width: 0.0, vector_height: 0.0, scale: 1.0, padding: Padding::default() }
    }
}

impl Dimensions {
    /// Padding converted to plane units.
    #[must_use]
    pub fn vector_padding(&self) -> Padding {
        Padding {
            top: self.padding.top / self.scale,
            right: self.padding.right / self.scale,
            bottom: self.padding.bottom / self.scale,
            left: self.padding.left / self.scale,
        }
    }

    /// The plane including its padding, in plane units. This is the area
    /// covered by the draw and selection backing rectangles.
    #[must_use]
    pub fn backing_rect(&self) -> Rect {
        let p = self.vector_padding();
        Rect::new(-p.left, -p.top, self.vector_width + p.left + p.right, self.vector_height + p.top + p.bottom)
    }
}

/// Converts client-pixel pointer positions into plane coordinates.
#[derive(Clone)]
pub struct CoordinateMapper {
    host: Rc<dyn SurfaceHost>,
    dims: Rc<Cell<Dimensions>>,
}

impl fmt::Debug for CoordinateMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateMapper").field("dims", &self.dims.get()).finish_non_exhaustive()
    }
}

impl CoordinateMapper {
    #[must_use]
    pub fn new(host: Rc<dyn SurfaceHost>, dims: Rc<Cell<Dimensions>>) -> Self {
        Self { host, dims }
    }

    /// Convert `event`'s client position to plane coordinates, then subtract
    /// `offset` (the grab point inside a dragged shape).
    ///
    /// The bounding box is measured on every call.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SurfaceUnavailable`] when the host has no
    /// bounding box, e.g. because a pointer event raced the surface mount.
    pub fn to_plane(&self, event: &PointerEvent, offset: Option<Point>) -> Result<Point, EditorError> {
        self.client_to_plane(event.client, offset)
    }

    /// As [`CoordinateMapper::to_plane`], for a bare client position.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SurfaceUnavailable`] when the host has no bounding box.
    pub fn client_to_plane(&self, client: Point, offset: Option<Point>) -> Result<Point, EditorError> {
        let bounds = self.host.bounding_client_rect().ok_or(EditorError::SurfaceUnavailable)?;
        let dims = self.dims.get();
        let offset = offset.unwrap_or_default();
        Ok(Point {
            x: (client.x - bounds.x - dims.padding.left) / dims.scale - offset.x,
            y: (client.y - bounds.y - dims.padding.top) / dims.scale - offset.y,
        })
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dims.get()
    }

    #[must_use]
    pub fn host(&self) -> &Rc<dyn SurfaceHost> {
        &self.host
    }
}
