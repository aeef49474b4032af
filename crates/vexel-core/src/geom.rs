//! Geometric tolerances and distance helpers.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Smallest meaningful tolerance. Setters silently clamp to this floor so a
/// comparison can never degenerate to exact float equality by accident.
pub const TOL_FLOOR: f64 = 1e-10;

/// Length/angle thresholds below which two geometric values compare equal.
///
/// The length tolerance treats two points closer than it as coincident; the
/// vector tolerance (radians) treats two directions within it as parallel.
/// Tolerances are plain values threaded explicitly through calls — there is
/// deliberately no process-global instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    point: f64,
    vector: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            point: 1e-7,
            vector: 1e-4,
        }
    }
}

impl Tolerance {
    /// Create a tolerance; values below [`TOL_FLOOR`] are raised to the floor.
    pub fn new(point: f64, vector: f64) -> Self {
        let mut tol = Self::default();
        tol.set_equal_point(point);
        tol.set_equal_vector(vector);
        tol
    }

    /// The tightest meaningful tolerance: both thresholds at the floor.
    pub fn minimal() -> Self {
        Self {
            point: TOL_FLOOR,
            vector: TOL_FLOOR,
        }
    }

    /// Length threshold for point coincidence.
    pub fn equal_point(&self) -> f64 {
        self.point
    }

    /// Angle threshold (radians) for direction equality.
    pub fn equal_vector(&self) -> f64 {
        self.vector
    }

    /// Set the length threshold, clamped to [`TOL_FLOOR`].
    pub fn set_equal_point(&mut self, tol: f64) {
        self.point = tol.max(TOL_FLOOR);
    }

    /// Set the angle threshold, clamped to [`TOL_FLOOR`].
    pub fn set_equal_vector(&mut self, tol: f64) {
        self.vector = tol.max(TOL_FLOOR);
    }

    /// Whether two points coincide under the length tolerance.
    pub fn points_equal(&self, a: Point, b: Point) -> bool {
        a.distance(b) <= self.point
    }
}

/// Inclusive axis-aligned overlap test.
///
/// `Rect::intersect(..).area() > 0.0` misses degenerate boxes (a horizontal
/// segment has zero height), so edge contact counts as overlap here.
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Nearest point on segment a→b to `point`, with its distance.
pub fn nearest_on_segment(point: Point, a: Point, b: Point) -> (Point, f64) {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return (a, pv.hypot());
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    (proj, point.distance(proj))
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    nearest_on_segment(point, a, b).1
}

/// Nearest point on a polyline to `point`: `(nearest, distance, segment)`.
///
/// The segment index names the edge `points[i]..points[i+1]` the nearest
/// point lies on (the closing edge of a closed polyline gets the last index).
/// Returns `None` for fewer than two points.
pub fn nearest_on_polyline(point: Point, points: &[Point], closed: bool) -> Option<(Point, f64, i32)> {
    if points.len() < 2 {
        return None;
    }
    let mut best: Option<(Point, f64, i32)> = None;
    let mut consider = |a: Point, b: Point, index: i32| {
        let (near, dist) = nearest_on_segment(point, a, b);
        if best.is_none_or(|(_, d, _)| dist < d) {
            best = Some((near, dist, index));
        }
    };
    for (i, w) in points.windows(2).enumerate() {
        consider(w[0], w[1], i as i32);
    }
    if closed {
        consider(points[points.len() - 1], points[0], (points.len() - 1) as i32);
    }
    best
}

/// Axis-aligned bounding box of a point sequence; `Rect::ZERO` when empty.
pub fn points_extent(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(*first, *first), |r, p| {
        r.union_pt(*p)
    })
}
