//! Shared numeric constants and reserved ids for the editor crate.

// ── Handles ─────────────────────────────────────────────────────

/// Recommended on-screen size of a resize handle, in pixels.
///
/// Edge handles are only offered when the shape's on-screen extent along the
/// edge exceeds twice this value, so they never overlap the corner handles.
pub const RECOMMENDED_HANDLE_SIZE_PX: f64 = 10.0;

// ── Selection ───────────────────────────────────────────────────

/// Minimum marquee extent (plane units, either axis) before a preview is shown.
pub const DEFAULT_MIN_SELECTION_DISTANCE: f64 = 15.0;

// ── Keyboard ────────────────────────────────────────────────────

/// Plane units moved or resized per arrow key press.
pub const DEFAULT_KEYBOARD_TRANSFORM_MULTIPLIER: f64 = 1.0;

// ── Reserved ids ────────────────────────────────────────────────

/// Shape id of the group-selection overlay.
pub const SELECTION_OVERLAY_ID: &str = "rse-internal-selection-component";

/// Shape id of the marquee preview.
pub const SELECTION_PREVIEW_ID: &str = "rse-internal-selection-draw-component";

/// Shape id of the draw preview.
pub const DRAW_PREVIEW_ID: &str = "rse-internal-draw-component";
