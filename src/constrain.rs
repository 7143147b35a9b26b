//! Injectable move/resize constraint strategies.
//!
//! Every pointer or keyboard transform passes its proposed point through one
//! of these functions before it reaches a rectangle. The defaults are identity
//! passthroughs; hosts swap in strategies that clamp to the plane, snap to a
//! grid, or hold an aspect ratio.

#[cfg(test)]
#[path = "constrain_test.rs"]
mod constrain_test;

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A coordinate axis. Used as a resize lock: a locked axis must come back
/// unchanged from the resize constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Input to a move constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstrainMoveArgs {
    /// Proposed top-left x.
    pub x: f64,
    /// Proposed top-left y.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Top-left x before this step.
    pub original_x: f64,
    /// Top-left y before this step.
    pub original_y: f64,
    pub vector_width: f64,
    pub vector_height: f64,
}

/// Input to a resize constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstrainResizeArgs {
    /// Moving corner before this step.
    pub original_moving_corner: Point,
    /// The corner that stays put.
    pub start_corner: Point,
    /// Proposed position of the moving corner.
    pub moving_corner: Point,
    pub locked_dimension: Option<Axis>,
    pub vector_width: f64,
    pub vector_height: f64,
}

pub type ConstrainMoveFn = Rc<dyn Fn(&ConstrainMoveArgs) -> Point>;
pub type ConstrainResizeFn = Rc<dyn Fn(&ConstrainResizeArgs) -> Point>;

/// Identity move constraint.
#[must_use]
pub fn default_constrain_move(args: &ConstrainMoveArgs) -> Point {
    Point::new(args.x, args.y)
}

/// Identity resize constraint.
#[must_use]
pub fn default_constrain_resize(args: &ConstrainResizeArgs) -> Point {
    args.moving_corner
}

/// Keep the whole rectangle inside `[0, vector_width] x [0, vector_height]`.
#[must_use]
pub fn clamp_move_to_plane(args: &ConstrainMoveArgs) -> Point {
    Point::new(
        args.x.min(args.vector_width - args.width).max(0.0),
        args.y.min(args.vector_height - args.height).max(0.0),
    )
}

/// Keep the moving corner inside the plane, honoring the axis lock.
#[must_use]
pub fn clamp_resize_to_plane(args: &ConstrainResizeArgs) -> Point {
    let x = args.moving_corner.x.clamp(0.0, args.vector_width.max(0.0));
    let y = args.moving_corner.y.clamp(0.0, args.vector_height.max(0.0));
    apply_lock(args, Point::new(x, y))
}

/// Build a resize constraint that snaps the moving corner to a grid of `step`.
///
/// A non-positive `step` disables snapping.
#[must_use]
pub fn snap_resize_to_grid(step: f64) -> ConstrainResizeFn {
    Rc::new(move |args: &ConstrainResizeArgs| {
        if step <= 0.0 {
            return args.moving_corner;
        }
        let snapped = Point::new(
            (args.moving_corner.x / step).round() * step,
            (args.moving_corner.y / step).round() * step,
        );
        apply_lock(args, snapped)
    })
}

fn apply_lock(args: &ConstrainResizeArgs, pt: Point) -> Point {
    match args.locked_dimension {
        Some(Axis::X) => Point::new(args.original_moving_corner.x, pt.y),
        Some(Axis::Y) => Point::new(pt.x, args.original_moving_corner.y),
        None => pt,
    }
}

/// The move/resize strategy pair used by a controller.
#[derive(Clone)]
pub struct Constraints {
    pub constrain_move: ConstrainMoveFn,
    pub constrain_resize: ConstrainResizeFn,
}

impl Constraints {
    /// Strategies that keep shapes inside the plane.
    #[must_use]
    pub fn clamped_to_plane() -> Self {
        Self {
            constrain_move: Rc::new(clamp_move_to_plane),
            constrain_resize: Rc::new(clamp_resize_to_plane),
        }
    }

    #[must_use]
    pub fn with_move(mut self, f: impl Fn(&ConstrainMoveArgs) -> Point + 'static) -> Self {
        self.constrain_move = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_resize(mut self, f: impl Fn(&ConstrainResizeArgs) -> Point + 'static) -> Self {
        self.constrain_resize = Rc::new(f);
        self
    }

    #[must_use]
    pub fn apply_move(&self, args: &ConstrainMoveArgs) -> Point {
        (self.constrain_move)(args)
    }

    #[must_use]
    pub fn apply_resize(&self, args: &ConstrainResizeArgs) -> Point {
        (self.constrain_resize)(args)
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            constrain_move: Rc::new(default_constrain_move),
            constrain_resize: Rc::new(default_constrain_resize),
        }
    }
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraints").finish_non_exhaustive()
    }
}
