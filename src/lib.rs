//! Headless interaction core for an SVG shape editor.
//!
//! The crate owns everything between raw pointer/keyboard input and the
//! application's shape list: converting client coordinates to plane
//! coordinates, drag-to-move and handle-resize gestures with pluggable
//! constraints, keyboard nudging, drag-to-create, marquee and shift-click
//! multi-selection with a group transform overlay, and focus bookkeeping.
//! Shapes are never stored here. Every committed change is reported through
//! callbacks and the application feeds the new rectangles back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`surface`] | Root [`surface::Surface`], config, and the shared [`surface::SurfaceContext`] |
//! | [`shape`] | Per-shape controller: move/resize/keyboard/focus/simulation |
//! | [`draw`] | Drag-to-create controller |
//! | [`selection`] | Marquee, toggle selection, and the group overlay |
//! | [`registry`] | Live shape registry per surface or selection |
//! | [`event_hub`] | Typed pub/sub with exclusive pointer claims |
//! | [`scheduler`] | Next-frame and deferred task queue |
//! | [`coords`] | Surface host trait, dimensions, and client-to-plane mapping |
//! | [`constrain`] | Move/resize constraint functions |
//! | [`geometry`] | Points, rectangles, and group scaling math |
//! | [`handles`] | Resize handle names, placement, and visibility |
//! | [`input`] | Pointer and key event types |
//! | [`render`] | Render props, [`render::Renderer`], and an SVG writer |
//! | [`consts`] | Shared constants (handle size, reserved ids, thresholds) |
//! | `web` | DOM binding (feature `web`) |

pub mod consts;
pub mod constrain;
pub mod coords;
pub mod draw;
pub mod error;
pub mod event_hub;
pub mod geometry;
pub mod handles;
pub mod input;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod selection;
pub mod shape;
pub mod surface;
#[cfg(feature = "web")]
pub mod web;

pub use error::EditorError;
