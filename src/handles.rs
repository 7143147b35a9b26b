//! Resize-handle geometry.
//!
//! Each handle drags one corner of the shape (edge handles drag a corner with
//! one axis locked) while the opposite corner stays anchored.

#[cfg(test)]
#[path = "handles_test.rs"]
mod handles_test;

use serde::Serialize;

use crate::consts::RECOMMENDED_HANDLE_SIZE_PX;
use crate::constrain::Axis;
use crate::geometry::{Point, Rect};

/// One of the eight resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleName {
    W,
    N,
    S,
    E,
    Nw,
    Ne,
    Sw,
    Se,
}

/// A rectangle corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Nw => Self::Se,
            Self::Ne => Self::Sw,
            Self::Sw => Self::Ne,
            Self::Se => Self::Nw,
        }
    }

    #[must_use]
    pub fn of(self, rect: &Rect) -> Point {
        match self {
            Self::Nw => Point::new(rect.x, rect.y),
            Self::Ne => Point::new(rect.right(), rect.y),
            Self::Sw => Point::new(rect.x, rect.bottom()),
            Self::Se => Point::new(rect.right(), rect.bottom()),
        }
    }
}

impl HandleName {
    /// Render order: edges first, then corners.
    pub const ALL: [HandleName; 8] = [Self::W, Self::N, Self::S, Self::E, Self::Nw, Self::Ne, Self::Sw, Self::Se];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W => "w",
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::Nw => "nw",
            Self::Ne => "ne",
            Self::Sw => "sw",
            Self::Se => "se",
        }
    }

    /// CSS cursor shown over the handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::W | Self::E => "ew-resize",
            Self::N | Self::S => "ns-resize",
            Self::Nw | Self::Se => "nwse-resize",
            Self::Ne | Self::Sw => "nesw-resize",
        }
    }

    /// The corner this handle drags.
    #[must_use]
    pub fn moving_corner(self) -> Corner {
        match self {
            Self::W | Self::Nw => Corner::Nw,
            Self::N | Self::Ne => Corner::Ne,
            Self::S | Self::Sw => Corner::Sw,
            Self::E | Self::Se => Corner::Se,
        }
    }

    /// Axis held fixed while dragging. Corner handles move freely.
    #[must_use]
    pub fn lock(self) -> Option<Axis> {
        match self {
            Self::W | Self::E => Some(Axis::Y),
            Self::N | Self::S => Some(Axis::X),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_edge(self) -> bool {
        self.lock().is_some()
    }

    /// Handle center relative to the shape's top-left corner.
    #[must_use]
    pub fn offset(self, width: f64, height: f64) -> Point {
        match self {
            Self::W => Point::new(0.0, height / 2.0),
            Self::N => Point::new(width / 2.0, 0.0),
            Self::S => Point::new(width / 2.0, height),
            Self::E => Point::new(width, height / 2.0),
            Self::Nw => Point::new(0.0, 0.0),
            Self::Ne => Point::new(width, 0.0),
            Self::Sw => Point::new(0.0, height),
            Self::Se => Point::new(width, height),
        }
    }
}

/// Handle size in plane units for the given scale.
#[must_use]
pub fn recommended_size(scale: f64) -> f64 {
    RECOMMENDED_HANDLE_SIZE_PX / scale
}

/// Position and presentation of one visible handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePlacement {
    pub name: HandleName,
    pub cursor: &'static str,
    /// Center, relative to the shape's top-left corner.
    pub x: f64,
    pub y: f64,
    pub recommended_size: f64,
}

/// Handles to offer for a `width` x `height` shape drawn at `scale`.
///
/// Corner handles are always present. `w`/`e` need the on-screen height to
/// exceed twice the recommended handle size, `n`/`s` the on-screen width.
#[must_use]
pub fn visible_handles(width: f64, height: f64, scale: f64) -> Vec<HandlePlacement> {
    let spacious_vertical = height * scale > RECOMMENDED_HANDLE_SIZE_PX * 2.0;
    let spacious_horizontal = width * scale > RECOMMENDED_HANDLE_SIZE_PX * 2.0;
    let size = recommended_size(scale);

    HandleName::ALL
        .into_iter()
        .filter(|name| match name {
            HandleName::W | HandleName::E => spacious_vertical,
            HandleName::N | HandleName::S => spacious_horizontal,
            _ => true,
        })
        .map(|name| {
            let at = name.offset(width, height);
            HandlePlacement { name, cursor: name.cursor(), x: at.x, y: at.y, recommended_size: size }
        })
        .collect()
}
