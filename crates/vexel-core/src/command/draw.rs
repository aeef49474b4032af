//! Interactive shape-construction state machine.

use crate::command::Motion;
use crate::container::Shapes;
use crate::geom::Tolerance;
use crate::shapes::Shape;
use crate::style::ShapeStyle;
use crate::surface::DrawSurface;
use kurbo::Point;

/// Per-kind construction policy for a draw session.
///
/// A rule knows how to instantiate its kind and how that kind grows and
/// shrinks during construction; the session supplies the gesture protocol.
pub trait DrawRule {
    /// Construct an empty shape of this rule's kind.
    fn create(&self) -> Box<dyn Shape>;

    /// Append the next control point while constructing.
    fn append_point(&self, shape: &mut dyn Shape, pt: Point);

    /// Remove the most recently appended control point.
    fn pop_point(&self, shape: &mut dyn Shape);

    /// Fewest control points at which the shape is valid to store.
    fn min_points(&self) -> usize;

    /// Most control points the kind accepts; None for unbounded.
    fn max_points(&self) -> Option<usize> {
        None
    }

    /// Whether the session should keep asking for points.
    fn can_add_point(&self, shape: &dyn Shape) -> bool {
        self.max_points()
            .is_none_or(|max| shape.point_count() < max)
    }

    /// Whether the shape already has enough fixed points to be stored.
    fn can_add_shape(&self, shape: &dyn Shape) -> bool {
        shape.point_count() >= self.min_points()
    }
}

/// One interactive construction session.
///
/// The session exclusively owns the in-progress shape until commit, at which
/// point ownership moves to the target container in a single step. Dropping
/// an active session is an implicit cancel.
pub struct DrawSession {
    rule: Box<dyn DrawRule>,
    shape: Option<Box<dyn Shape>>,
    /// Number of points fixed so far; the anchor placed by `begin` counts.
    fixed: usize,
    /// Whether the shape's last point is still provisional.
    floating: bool,
    /// Restart construction at the commit point after each commit.
    continuous: bool,
    /// Tolerance used for the coincident-point guard.
    pub tolerance: Tolerance,
    /// Style applied to the preview and to the committed shape.
    pub style: ShapeStyle,
}

impl DrawSession {
    pub fn new(rule: Box<dyn DrawRule>) -> Self {
        Self {
            rule,
            shape: None,
            fixed: 0,
            floating: false,
            continuous: false,
            tolerance: Tolerance::default(),
            style: ShapeStyle::default(),
        }
    }

    /// Keep drawing shape after shape without re-activating the tool.
    pub fn set_continuous(&mut self, on: bool) {
        self.continuous = on;
    }

    pub fn is_active(&self) -> bool {
        self.shape.is_some()
    }

    /// Construction progress: how many points are fixed.
    pub fn step(&self) -> usize {
        self.fixed
    }

    /// The in-progress shape, for selection/preview logic.
    pub fn shape(&self) -> Option<&dyn Shape> {
        self.shape.as_deref()
    }

    /// Start a session: instantiate the shape and seed its first point.
    /// Refused (state unchanged) while a session is already active.
    pub fn begin(&mut self, motion: &Motion) -> bool {
        if self.shape.is_some() {
            return false;
        }
        let mut shape = self.rule.create();
        self.rule.append_point(shape.as_mut(), motion.point);
        shape.update();
        log::debug!("draw session begins at {:?}", motion.point);
        self.shape = Some(shape);
        self.fixed = 1;
        self.floating = false;
        true
    }

    /// Record a provisional point for the current step.
    pub fn touch_began(&mut self, motion: &Motion) -> bool {
        self.float_point(motion.point)
    }

    /// Live-update the provisional point so the preview stays accurate.
    pub fn touch_moved(&mut self, motion: &Motion) -> bool {
        self.float_point(motion.point)
    }

    /// Fix the current point; commits into `shapes` once the shape is valid
    /// and the rule wants no further points. Returns the committed id.
    pub fn touch_ended(
        &mut self,
        motion: &Motion,
        shapes: &mut Shapes,
    ) -> Option<u32> {
        if !self.fix_point(motion.point) {
            return None;
        }
        self.try_commit(shapes, motion)
    }

    /// Single-click entry: fix a point directly, with the same finalize
    /// behavior as the touch sequence.
    pub fn click(&mut self, motion: &Motion, shapes: &mut Shapes) -> Option<u32> {
        if !self.fix_point(motion.point) {
            return None;
        }
        self.try_commit(shapes, motion)
    }

    /// Finish gesture for open-ended kinds: fix the final point if it is
    /// distinguishable, then commit whenever the minimum point count holds.
    pub fn double_click(
        &mut self,
        motion: &Motion,
        shapes: &mut Shapes,
    ) -> Option<u32> {
        if self.shape.is_none() {
            return None;
        }
        // A coincident final point adds nothing but does not block finishing.
        if !self.fix_point(motion.point) && self.floating {
            self.drop_floating();
        }
        let shape = self.shape.as_ref()?;
        if self.rule.can_add_shape(shape.as_ref()) {
            self.commit(shapes, motion)
        } else {
            None
        }
    }

    /// Alternate finish gesture; same invariants as `double_click`.
    pub fn long_press(
        &mut self,
        motion: &Motion,
        shapes: &mut Shapes,
    ) -> Option<u32> {
        self.double_click(motion, shapes)
    }

    /// Discard the in-progress shape. Always succeeds.
    pub fn cancel(&mut self) {
        if self.shape.take().is_some() {
            log::debug!("draw session canceled at step {}", self.fixed);
        }
        self.fixed = 0;
        self.floating = false;
    }

    /// Step back: drop the provisional point if one exists, else remove the
    /// most recently fixed point. At or below the rule's minimum point count
    /// there is no prior step to return to, so undo degrades to a cancel.
    pub fn undo(&mut self) {
        let Some(shape) = self.shape.as_mut() else {
            return;
        };
        if self.floating {
            self.rule.pop_point(shape.as_mut());
            shape.update();
            self.floating = false;
        } else if self.fixed > self.rule.min_points() {
            self.rule.pop_point(shape.as_mut());
            shape.update();
            self.fixed -= 1;
        } else {
            self.cancel();
        }
    }

    /// Render the in-progress shape with the session style. Never mutates
    /// session state.
    pub fn draw(&self, surface: &mut dyn DrawSurface) -> bool {
        match &self.shape {
            Some(shape) => surface.draw_shape(shape.as_ref(), &self.style),
            None => false,
        }
    }

    /// Place or move the provisional point.
    fn float_point(&mut self, pt: Point) -> bool {
        let Some(shape) = self.shape.as_mut() else {
            return false;
        };
        if self.floating {
            let idx = shape.point_count() - 1;
            shape.set_point(idx, pt);
        } else {
            if !self.rule.can_add_point(shape.as_ref()) {
                return false;
            }
            self.rule.append_point(shape.as_mut(), pt);
            self.floating = true;
        }
        shape.update();
        true
    }

    /// Turn the provisional point into a fixed one. A point coincident with
    /// the previous fixed point (under the session tolerance) is rejected
    /// and stays provisional, awaiting a distinguishable input.
    fn fix_point(&mut self, pt: Point) -> bool {
        if !self.float_point(pt) {
            return false;
        }
        let Some(shape) = self.shape.as_mut() else {
            return false;
        };
        let idx = shape.point_count() - 1;
        if idx > 0 && self.tolerance.points_equal(shape.point(idx - 1), pt) {
            return false;
        }
        shape.update();
        self.floating = false;
        self.fixed += 1;
        true
    }

    /// Drop the provisional point entirely.
    fn drop_floating(&mut self) {
        if let Some(shape) = self.shape.as_mut() {
            self.rule.pop_point(shape.as_mut());
            shape.update();
        }
        self.floating = false;
    }

    fn try_commit(
        &mut self,
        shapes: &mut Shapes,
        motion: &Motion,
    ) -> Option<u32> {
        let shape = self.shape.as_ref()?;
        if self.rule.can_add_shape(shape.as_ref()) && !self.rule.can_add_point(shape.as_ref()) {
            self.commit(shapes, motion)
        } else {
            None
        }
    }

    /// Hand the finished shape to the container; ownership moves in one step.
    fn commit(&mut self, shapes: &mut Shapes, motion: &Motion) -> Option<u32> {
        let mut shape = self.shape.take()?;
        shape.update();
        let id = shapes.add_copy(shape.as_ref(), self.style.clone()).id();
        log::debug!("draw session committed shape id {}", id);
        self.fixed = 0;
        self.floating = false;
        if self.continuous {
            self.begin(motion);
        }
        Some(id)
    }
}

impl std::fmt::Debug for DrawSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawSession")
            .field("active", &self.shape.is_some())
            .field("fixed", &self.fixed)
            .field("floating", &self.floating)
            .finish()
    }
}
