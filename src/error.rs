//! Error type for the editor crate.
//!
//! Configuration mistakes are reported from constructors so that a host
//! integration fails on its first run. Degenerate geometry is never an error;
//! see the draw and selection controllers for how it is handled.

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("scale must be a finite number greater than zero (got {scale})")]
    InvalidScale { scale: f64 },
    #[error("padding must be finite and non-negative (got {side} = {value})")]
    InvalidPadding { side: &'static str, value: f64 },
    #[error("vector dimensions must be finite and non-negative (got {width}x{height})")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("keyboard transform multiplier must be finite (got {multiplier})")]
    InvalidMultiplier { multiplier: f64 },
    #[error("editing surface is not mounted; no bounding box available")]
    SurfaceUnavailable,
    #[error("failed to parse editor config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("host binding failed: {0}")]
    HostBinding(String),
}
