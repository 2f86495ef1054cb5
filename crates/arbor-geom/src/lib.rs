//! Integer geometry primitives used across arbor.

/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;
/// Width/height size type.
mod size;

pub use point::Point;
pub use rect::Rect;
pub use size::Size;
