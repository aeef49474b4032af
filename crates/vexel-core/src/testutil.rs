//! Concrete fixture shapes for tests.
//!
//! Real shape kinds live in the surrounding application; these minimal kinds
//! exist so the contract, container, and draw session can be exercised
//! end to end.

use crate::command::DrawRule;
use crate::geom::{nearest_on_polyline, nearest_on_segment};
use crate::shapes::{base, HitResult, Shape, ShapeBase, ShapeFlag, TAG_USER};
use crate::storage::{Storage, StorageResult};
use crate::style::ShapeStyle;
use crate::surface::DrawSurface;
use kurbo::{Affine, Point, Rect, Vec2};
use std::any::Any;

/// Capability group shared by segment-based kinds.
pub(crate) const TAG_LINEAR: u32 = 2;
pub(crate) const TAG_SEGMENT: u32 = TAG_USER;
pub(crate) const TAG_POLYLINE: u32 = TAG_USER + 1;

/// Two-point line segment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    base: ShapeBase,
    points: Vec<Point>,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            base: ShapeBase::new(),
            points: vec![start, end],
        }
    }

    pub fn empty() -> Self {
        Self {
            base: ShapeBase::new(),
            points: Vec::with_capacity(2),
        }
    }

    pub fn create() -> Box<dyn Shape> {
        Box::new(Self::empty())
    }

    pub fn push(&mut self, pt: Point) {
        if self.points.len() < 2 {
            self.points.push(pt);
        }
    }

    pub fn pop(&mut self) {
        self.points.pop();
    }
}

impl Shape for Segment {
    fn type_tag(&self) -> u32 {
        TAG_SEGMENT
    }

    fn is_kind_of(&self, tag: u32) -> bool {
        tag == TAG_SEGMENT || tag == TAG_LINEAR || tag == crate::shapes::TAG_SHAPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn copy_from(&mut self, src: &dyn Shape) -> bool {
        match src.as_any().downcast_ref::<Self>() {
            Some(other) => {
                *self = other.clone();
                true
            }
            None => false,
        }
    }

    fn equals(&self, other: &dyn Shape) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| self == o)
    }

    fn extent(&self) -> Rect {
        self.base.extent
    }

    fn update(&mut self) {
        self.base.update_extent_from(&self.points);
    }

    fn transform(&mut self, affine: Affine) {
        for p in &mut self.points {
            *p = affine * *p;
        }
        self.update();
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    fn set_point(&mut self, index: usize, pt: Point) {
        if index < self.points.len() {
            self.points[index] = pt;
        }
    }

    fn hit_test(&self, pt: Point, tol: f64) -> HitResult {
        if self.points.len() < 2 {
            return HitResult::miss();
        }
        let (near, dist) = nearest_on_segment(pt, self.points[0], self.points[1]);
        if dist > tol {
            return HitResult::miss();
        }
        HitResult::new(dist, near, 0)
    }

    fn set_handle_point(&mut self, index: usize, pt: Point, tol: f64) -> bool {
        if self.flag(ShapeFlag::FixedLength) && self.points.len() == 2 && index < 2 {
            base::rotate_handle_move(self, index, pt, 1 - index)
        } else {
            base::guarded_handle_move(self, index, pt, tol)
        }
    }

    fn offset(&mut self, delta: Vec2, _segment: i32) -> bool {
        base::offset_all(self, delta)
    }

    fn save(&self, s: &mut dyn Storage) -> StorageResult<()> {
        self.base.save(s)?;
        s.write_u32("count", self.points.len() as u32)?;
        for (i, p) in self.points.iter().enumerate() {
            s.write_point(&format!("pt{i}"), *p)?;
        }
        Ok(())
    }

    fn load(&mut self, s: &mut dyn Storage) -> StorageResult<()> {
        let bits = ShapeBase::load_bits(s)?;
        let count = s.read_u32("count")? as usize;
        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            points.push(s.read_point(&format!("pt{i}"))?);
        }
        self.base.set_bits(bits);
        self.points = points;
        self.update();
        Ok(())
    }

    fn flag(&self, bit: ShapeFlag) -> bool {
        self.base.flag(bit)
    }

    fn set_flag(&mut self, bit: ShapeFlag, on: bool) {
        self.base.set_flag(bit, on);
    }
}

/// Open or closed polyline with an unbounded point count.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Polyline {
    base: ShapeBase,
    points: Vec<Point>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create() -> Box<dyn Shape> {
        Box::new(Self::new())
    }

    pub fn push(&mut self, pt: Point) {
        self.points.push(pt);
    }

    pub fn pop(&mut self) {
        self.points.pop();
    }
}

impl Shape for Polyline {
    fn type_tag(&self) -> u32 {
        TAG_POLYLINE
    }

    fn is_kind_of(&self, tag: u32) -> bool {
        tag == TAG_POLYLINE || tag == TAG_LINEAR || tag == crate::shapes::TAG_SHAPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(self.clone())
    }

    fn copy_from(&mut self, src: &dyn Shape) -> bool {
        match src.as_any().downcast_ref::<Self>() {
            Some(other) => {
                *self = other.clone();
                true
            }
            None => false,
        }
    }

    fn equals(&self, other: &dyn Shape) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| self == o)
    }

    fn extent(&self) -> Rect {
        self.base.extent
    }

    fn update(&mut self) {
        self.base.update_extent_from(&self.points);
    }

    fn transform(&mut self, affine: Affine) {
        for p in &mut self.points {
            *p = affine * *p;
        }
        self.update();
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    fn set_point(&mut self, index: usize, pt: Point) {
        if index < self.points.len() {
            self.points[index] = pt;
        }
    }

    fn hit_test(&self, pt: Point, tol: f64) -> HitResult {
        match nearest_on_polyline(pt, &self.points, self.is_closed()) {
            Some((near, dist, segment)) if dist <= tol => HitResult::new(dist, near, segment),
            _ => HitResult::miss(),
        }
    }

    fn set_handle_point(&mut self, index: usize, pt: Point, tol: f64) -> bool {
        base::guarded_handle_move(self, index, pt, tol)
    }

    fn offset(&mut self, delta: Vec2, segment: i32) -> bool {
        if self.flag(ShapeFlag::Locked) {
            return false;
        }
        let edge = usize::try_from(segment).ok();
        match edge {
            // Move only the named edge's endpoints.
            Some(i) if i + 1 < self.points.len() => {
                self.points[i] += delta;
                self.points[i + 1] += delta;
                self.update();
                true
            }
            _ => base::offset_all(self, delta),
        }
    }

    fn save(&self, s: &mut dyn Storage) -> StorageResult<()> {
        self.base.save(s)?;
        s.write_u32("count", self.points.len() as u32)?;
        for (i, p) in self.points.iter().enumerate() {
            s.write_point(&format!("pt{i}"), *p)?;
        }
        Ok(())
    }

    fn load(&mut self, s: &mut dyn Storage) -> StorageResult<()> {
        let bits = ShapeBase::load_bits(s)?;
        let count = s.read_u32("count")? as usize;
        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            points.push(s.read_point(&format!("pt{i}"))?);
        }
        self.base.set_bits(bits);
        self.points = points;
        self.update();
        Ok(())
    }

    fn flag(&self, bit: ShapeFlag) -> bool {
        self.base.flag(bit)
    }

    fn set_flag(&mut self, bit: ShapeFlag, on: bool) {
        self.base.set_flag(bit, on);
    }
}

/// Draw rule for two-point segments: exactly two points, auto-commit.
pub(crate) struct SegmentRule;

impl DrawRule for SegmentRule {
    fn create(&self) -> Box<dyn Shape> {
        Segment::create()
    }

    fn append_point(&self, shape: &mut dyn Shape, pt: Point) {
        if let Some(s) = shape.as_any_mut().downcast_mut::<Segment>() {
            s.push(pt);
        }
    }

    fn pop_point(&self, shape: &mut dyn Shape) {
        if let Some(s) = shape.as_any_mut().downcast_mut::<Segment>() {
            s.pop();
        }
    }

    fn min_points(&self) -> usize {
        2
    }

    fn max_points(&self) -> Option<usize> {
        Some(2)
    }
}

/// Draw rule for polylines: at least two points, finished by gesture.
pub(crate) struct PolylineRule;

impl DrawRule for PolylineRule {
    fn create(&self) -> Box<dyn Shape> {
        Polyline::create()
    }

    fn append_point(&self, shape: &mut dyn Shape, pt: Point) {
        if let Some(s) = shape.as_any_mut().downcast_mut::<Polyline>() {
            s.push(pt);
        }
    }

    fn pop_point(&self, shape: &mut dyn Shape) {
        if let Some(s) = shape.as_any_mut().downcast_mut::<Polyline>() {
            s.pop();
        }
    }

    fn min_points(&self) -> usize {
        2
    }
}

/// Surface that records what was dispatched to it.
pub(crate) struct RecordingSurface {
    pub clip: Rect,
    /// (kind tag, extent) per dispatched shape.
    pub drawn: Vec<(u32, Rect)>,
}

impl RecordingSurface {
    pub fn new(clip: Rect) -> Self {
        Self {
            clip,
            drawn: Vec::new(),
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn clip_bounds(&self) -> Rect {
        self.clip
    }

    fn draw_shape(&mut self, shape: &dyn Shape, _style: &ShapeStyle) -> bool {
        self.drawn.push((shape.type_tag(), shape.extent()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_hit_respects_tolerance() {
        let mut s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        s.update();
        let hit = s.hit_test(Point::new(5.0, 2.0), 3.0);
        assert!((hit.distance - 2.0).abs() < 1e-12);
        assert_eq!(hit.segment, 0);
        assert_eq!(hit.nearest, Point::new(5.0, 0.0));

        let miss = s.hit_test(Point::new(5.0, 2.0), 1.0);
        assert_eq!(miss.distance, f64::MAX);
    }

    #[test]
    fn test_polyline_segment_offset() {
        let mut p = Polyline::new();
        p.push(Point::new(0.0, 0.0));
        p.push(Point::new(10.0, 0.0));
        p.push(Point::new(10.0, 10.0));
        p.update();

        assert!(p.offset(Vec2::new(0.0, 1.0), 0));
        assert_eq!(p.point(0), Point::new(0.0, 1.0));
        assert_eq!(p.point(1), Point::new(10.0, 1.0));
        // The edge not named stays put at its far end.
        assert_eq!(p.point(2), Point::new(10.0, 10.0));

        // Out-of-range segment falls back to a whole-shape move.
        assert!(p.offset(Vec2::new(1.0, 0.0), -1));
        assert_eq!(p.point(2), Point::new(11.0, 10.0));
    }

    #[test]
    fn test_closed_polyline_hit_on_closing_edge() {
        let mut p = Polyline::new();
        p.push(Point::new(0.0, 0.0));
        p.push(Point::new(10.0, 0.0));
        p.push(Point::new(10.0, 10.0));
        p.push(Point::new(0.0, 10.0));
        p.set_flag(ShapeFlag::Closed, true);
        p.update();
        assert!(p.is_closed());

        let hit = p.hit_test(Point::new(-1.0, 5.0), 2.0);
        assert_eq!(hit.segment, 3);
        assert!((hit.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_length_segment_handle_rotates() {
        let mut s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        s.update();
        s.set_flag(ShapeFlag::FixedLength, true);

        assert!(s.set_handle_point(1, Point::new(0.0, 4.0), 0.1));
        let end = s.point(1);
        assert!((end.distance(Point::new(0.0, 0.0)) - 10.0).abs() < 1e-9);
        assert!((end.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_length_handle_out_of_range_is_refused() {
        let mut s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        s.update();
        s.set_flag(ShapeFlag::FixedLength, true);

        assert!(!s.set_handle_point(2, Point::new(3.0, 3.0), 0.1));
        assert_eq!(s.point(0), Point::new(0.0, 0.0));
        assert_eq!(s.point(1), Point::new(10.0, 0.0));
    }
}
