//! Vexel Editing Core
//!
//! Platform-agnostic editing model for an interactive 2D vector-graphics
//! engine: the shape capability contract, the owning shape container, the
//! interactive draw session, and the tolerance/persistence plumbing they
//! share. Concrete shape geometry, rendering backends, and platform input
//! live in the surrounding application and plug in through the traits here.

pub mod command;
pub mod container;
pub mod geom;
pub mod shapes;
pub mod storage;
pub mod style;
pub mod surface;

#[cfg(test)]
pub(crate) mod testutil;

pub use command::{DrawRule, DrawSession, Modifiers, Motion};
pub use container::{ContainerHit, ShapeEntry, Shapes};
pub use geom::{Tolerance, TOL_FLOOR};
pub use shapes::{HitResult, Shape, ShapeBase, ShapeFactory, ShapeFlag, ShapeRegistry};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use style::{SerializableColor, ShapeStyle};
pub use surface::DrawSurface;
