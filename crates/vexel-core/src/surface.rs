//! Drawing-surface capability.
//!
//! The rendering backend lives outside this core; shapes and containers only
//! see the current clip region and a per-shape draw entry point.

use crate::shapes::Shape;
use crate::style::ShapeStyle;
use kurbo::Rect;

/// Abstract drawing surface consumed by container and session rendering.
pub trait DrawSurface {
    /// Current clip region in model coordinates.
    fn clip_bounds(&self) -> Rect;

    /// Draw one shape with its resolved style. Returns false if the backend
    /// skipped it (e.g. clipped away after the broad cull).
    fn draw_shape(&mut self, shape: &dyn Shape, style: &ShapeStyle) -> bool;
}
