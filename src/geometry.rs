//! Plane geometry: points, rectangles and the group-transform projection.
//!
//! All values are plane coordinates, i.e. already divided by the surface
//! scale factor and shifted past the padding. Rectangles never carry negative
//! sizes; every rectangle the editor produces comes out of
//! [`rect_from_corners`].

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Axis-aligned rectangle with a non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn far_corner(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test: rectangles that merely touch do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.x && self.x < other.right() && self.bottom() > other.y && self.y < other.bottom()
    }

    /// Whether `pt` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }
}

/// Normalize two arbitrary corners into a rectangle.
#[must_use]
pub fn rect_from_corners(c1: Point, c2: Point) -> Rect {
    Rect {
        x: c1.x.min(c2.x),
        y: c1.y.min(c2.y),
        width: (c1.x - c2.x).abs(),
        height: (c1.y - c2.y).abs(),
    }
}

/// Union bounding box of `rects`, or `None` when empty.
#[must_use]
pub fn union_bounds(rects: &[Rect]) -> Option<Rect> {
    let first = rects.first()?;
    let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.right(), first.bottom());
    for r in &rects[1..] {
        left = left.min(r.x);
        top = top.min(r.y);
        right = right.max(r.right());
        bottom = bottom.max(r.bottom());
    }
    Some(Rect::new(left, top, right - left, bottom - top))
}

/// Re-project `child` from the selection box `start` into the box `end`.
///
/// Each axis scales by `end / start`. An axis whose start extent is zero, or
/// whose scale comes out as zero, keeps the child's size on that axis instead
/// of collapsing it.
#[must_use]
pub fn scale_into_selection(start: &Rect, end: &Rect, child: &Rect) -> Rect {
    let scale_x = if start.width == 0.0 { 0.0 } else { end.width / start.width };
    let scale_y = if start.height == 0.0 { 0.0 } else { end.height / start.height };

    Rect {
        x: end.x + (child.x - start.x) * scale_x,
        y: end.y + (child.y - start.y) * scale_y,
        width: if scale_x == 0.0 { child.width } else { child.width * scale_x },
        height: if scale_y == 0.0 { child.height } else { child.height * scale_y },
    }
}
