//! Shared shape plumbing.
//!
//! Concrete kinds embed [`ShapeBase`] for the cached extent and flag bits,
//! and compose the free helpers below into their trait impls instead of
//! inheriting them. Each kind keeps only the overrides it actually needs.

use super::{Shape, ShapeFlag};
use crate::geom;
use crate::storage::{Storage, StorageResult};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Extent cache and flag set embedded by every concrete shape kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeBase {
    /// Cached axis-aligned extent; valid only after the owning shape's
    /// `update`.
    pub extent: Rect,
    flags: u32,
}

impl ShapeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&self, bit: ShapeFlag) -> bool {
        self.flags & bit.mask() != 0
    }

    pub fn set_flag(&mut self, bit: ShapeFlag, on: bool) {
        if on {
            self.flags |= bit.mask();
        } else {
            self.flags &= !bit.mask();
        }
    }

    /// Raw flag bits, for structural comparison and persistence.
    pub fn bits(&self) -> u32 {
        self.flags
    }

    pub fn set_bits(&mut self, bits: u32) {
        self.flags = bits;
    }

    /// Recompute the cached extent from a control-point sequence.
    pub fn update_extent_from(&mut self, points: &[Point]) {
        self.extent = geom::points_extent(points);
    }

    /// Persist the flag bits under the conventional field name.
    pub fn save(&self, s: &mut dyn Storage) -> StorageResult<()> {
        s.write_u32("flags", self.flags)
    }

    /// Read flag bits written by [`ShapeBase::save`]. Returned rather than
    /// applied so loaders can stage all fields before mutating anything.
    pub fn load_bits(s: &mut dyn Storage) -> StorageResult<u32> {
        s.read_u32("flags")
    }
}

/// Default handle move for kinds whose handles map one-to-one onto control
/// points: refuses moves on locked shapes and moves that would collapse the
/// grabbed point onto an adjacent one within `tol`.
pub fn guarded_handle_move(shape: &mut dyn Shape, index: usize, pt: Point, tol: f64) -> bool {
    if shape.flag(ShapeFlag::Locked) || index >= shape.point_count() {
        return false;
    }
    let count = shape.point_count();
    let mut neighbors = Vec::with_capacity(2);
    if index > 0 {
        neighbors.push(index - 1);
    } else if shape.is_closed() && count > 2 {
        neighbors.push(count - 1);
    }
    if index + 1 < count {
        neighbors.push(index + 1);
    } else if shape.is_closed() && count > 2 {
        neighbors.push(0);
    }
    if neighbors.iter().any(|&n| shape.point(n).distance(pt) <= tol) {
        return false;
    }
    shape.set_point(index, pt);
    shape.update();
    true
}

/// Fixed-length handle move: the grabbed point follows the direction of the
/// drag but keeps its distance to the pivot point, so the shape rotates
/// instead of stretching. Refused when the drag gives no direction or the
/// shape disables rotation.
pub fn rotate_handle_move(shape: &mut dyn Shape, index: usize, pt: Point, pivot_index: usize) -> bool {
    if shape.flag(ShapeFlag::Locked)
        || shape.flag(ShapeFlag::RotateDisabled)
        || index >= shape.point_count()
        || pivot_index >= shape.point_count()
        || index == pivot_index
    {
        return false;
    }
    let pivot = shape.point(pivot_index);
    let radius = pivot.distance(shape.point(index));
    let drag = pt - pivot;
    let len = drag.hypot();
    if len < f64::EPSILON {
        return false;
    }
    let dir = drag / len;
    shape.set_point(index, pivot + dir * radius);
    shape.update();
    true
}

/// Default whole-shape offset: translate every control point. Refused on
/// locked shapes.
pub fn offset_all(shape: &mut dyn Shape, delta: Vec2) -> bool {
    if shape.flag(ShapeFlag::Locked) {
        return false;
    }
    for i in 0..shape.point_count() {
        let p = shape.point(i);
        shape.set_point(i, p + delta);
    }
    shape.update();
    true
}
