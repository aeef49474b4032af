//! The shape contract: the capability set every drawable geometric object
//! implements. Concrete shape kinds live in the surrounding application and
//! plug in through [`Shape`] plus a tag registered in a [`ShapeRegistry`].

pub mod base;

pub use base::ShapeBase;

use crate::storage::{Storage, StorageError, StorageResult};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Capability-group tag matched by every shape's `is_kind_of`.
pub const TAG_SHAPE: u32 = 1;

/// First tag value available to application-defined kinds. Lower values are
/// reserved for capability groups.
pub const TAG_USER: u32 = 32;

/// Per-shape feature flags, stored as bits in [`ShapeBase::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeFlag {
    /// Constrained to equal extents on both axes.
    Square = 0,
    /// Geometry closes back onto its first point.
    Closed = 1,
    /// Edge lengths are fixed; handle moves rotate instead of stretch.
    FixedLength = 2,
    /// Shape refuses offset/handle mutation.
    Locked = 3,
    /// Rotation-correlated handle adjustment is disabled.
    RotateDisabled = 4,
}

impl ShapeFlag {
    fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

/// Outcome of a proximity hit test.
///
/// `distance` is always comparable: a miss carries `f64::MAX`, never a
/// negative value or NaN, so the nearest hit across heterogeneous shapes is
/// a plain minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Distance from the probe point to the nearest geometry.
    pub distance: f64,
    /// Nearest point on the shape.
    pub nearest: Point,
    /// Which part of the shape was nearest; meaning is defined per kind.
    pub segment: i32,
}

impl HitResult {
    /// Sentinel for "no meaningful hit geometry within reach".
    pub fn miss() -> Self {
        Self {
            distance: f64::MAX,
            nearest: Point::ZERO,
            segment: -1,
        }
    }

    pub fn new(distance: f64, nearest: Point, segment: i32) -> Self {
        Self {
            distance,
            nearest,
            segment,
        }
    }
}

/// Zero-argument constructor for one concrete shape kind.
pub type ShapeFactory = fn() -> Box<dyn Shape>;

/// Abstract capability set of a drawable geometric object.
///
/// The bounding box returned by [`Shape::extent`] is a cache: it is only
/// valid after [`Shape::update`], which callers must invoke after any point
/// mutation. `set_point` deliberately does not recompute it.
pub trait Shape: std::fmt::Debug {
    /// Closed small integer identifying the concrete kind.
    fn type_tag(&self) -> u32;

    /// True for the exact tag and every ancestor capability-group tag.
    fn is_kind_of(&self, tag: u32) -> bool {
        tag == self.type_tag() || tag == TAG_SHAPE
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Fully independent deep copy; ownership transfers to the caller.
    fn clone_box(&self) -> Box<dyn Shape>;

    /// Overwrite this shape's data from `src`. A type mismatch is a silent
    /// no-op reported by the `false` return.
    fn copy_from(&mut self, src: &dyn Shape) -> bool;

    /// Structural value equality: same concrete kind, bitwise-equal points
    /// and flags. Tolerance plays no part here; it belongs to hit-testing.
    fn equals(&self, other: &dyn Shape) -> bool;

    /// Cached bounding box; valid only after `update`.
    fn extent(&self) -> Rect;

    /// Recompute the bounding box and derived geometry. Idempotent.
    fn update(&mut self);

    /// Apply an affine transform to all points and the box.
    fn transform(&mut self, affine: Affine);

    fn point_count(&self) -> usize;
    fn point(&self, index: usize) -> Point;
    /// Direct control-point write; caller must `update` before relying on
    /// the extent again.
    fn set_point(&mut self, index: usize, pt: Point);

    fn is_closed(&self) -> bool {
        self.flag(ShapeFlag::Closed)
    }

    /// Distance from `pt` to the nearest geometry within `tol`; a miss
    /// returns [`HitResult::miss`].
    fn hit_test(&self, pt: Point, tol: f64) -> HitResult;

    /// Broad-phase box intersection; extent overlap is an allowed
    /// conservative answer.
    fn hit_test_box(&self, rect: Rect) -> bool {
        crate::geom::boxes_overlap(self.extent(), rect)
    }

    /// Editing grips. The default maps handles one-to-one onto control
    /// points; kinds with synthetic grips override all three.
    fn handle_count(&self) -> usize {
        self.point_count()
    }

    fn handle_point(&self, index: usize) -> Point {
        self.point(index)
    }

    /// Move an editing grip. Returns false (leaving the shape untouched)
    /// when the move would collapse geometry below `tol` or the shape is
    /// locked; kinds may also adjust correlated handles.
    fn set_handle_point(&mut self, index: usize, pt: Point, tol: f64) -> bool;

    /// Translate the geometry, or the part named by `segment` where the kind
    /// supports partial moves. False when the move is refused (locked flag).
    fn offset(&mut self, delta: Vec2, segment: i32) -> bool;

    fn save(&self, s: &mut dyn Storage) -> StorageResult<()>;

    /// All-or-nothing: on error the shape is left unchanged.
    fn load(&mut self, s: &mut dyn Storage) -> StorageResult<()>;

    fn flag(&self, bit: ShapeFlag) -> bool;
    fn set_flag(&mut self, bit: ShapeFlag, on: bool);
}

/// Declarative table mapping kind tags to factories, used to reconstruct
/// shapes from storage and to seed draw sessions.
#[derive(Default)]
pub struct ShapeRegistry {
    factories: Vec<(u32, ShapeFactory)>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a kind tag, replacing any previous entry.
    pub fn register(&mut self, tag: u32, factory: ShapeFactory) {
        if let Some(slot) = self.factories.iter_mut().find(|(t, _)| *t == tag) {
            slot.1 = factory;
        } else {
            self.factories.push((tag, factory));
        }
    }

    /// Instantiate an empty shape of the registered kind.
    pub fn create(&self, tag: u32) -> StorageResult<Box<dyn Shape>> {
        self.factories
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, f)| f())
            .ok_or(StorageError::UnknownKind(tag))
    }
}
