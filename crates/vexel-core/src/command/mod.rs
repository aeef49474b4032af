//! Interactive command layer: normalized motion events and the draw session
//! state machine.

mod draw;

pub use draw::{DrawRule, DrawSession};

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Normalized pointer event, already translated to model coordinates by the
/// platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Position in model coordinates.
    pub point: Point,
    /// Seconds from an arbitrary origin; monotonically increasing within one
    /// event source.
    pub time: f64,
    /// Whether the primary pointer is currently down.
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl Motion {
    pub fn new(point: Point, time: f64, pressed: bool, modifiers: Modifiers) -> Self {
        Self {
            point,
            time,
            pressed,
            modifiers,
        }
    }

    /// Convenience for a plain unmodified event.
    pub fn at(point: Point, time: f64) -> Self {
        Self::new(point, time, false, Modifiers::default())
    }
}
