//! Orientation predicates.
//!
//! Coordinates follow a left-handed convention (y grows downwards), so a
//! positive orientation is a counter-clockwise turn on screen. Obstacle
//! outlines are stored clockwise and holes counter-clockwise in this frame.

use std::f64::consts::TAU;

use super::{
    widen, Point2, Point2D, ANGLE_EPSILON, COLL_EPSILON, COLL_EPSILON_D, EPSILON, EPSILON_D,
};

/// Counter-clockwise angle of the ray `a -> b`, in `[0, 2π)`.
#[must_use]
pub fn ccw_angle(a: Point2, b: Point2) -> f64 {
    let a = widen(a);
    let b = widen(b);
    let angle = (-(b.y - a.y)).atan2(b.x - a.x);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Orientation of the ordered triplet at single precision.
///
/// Positive for counter-clockwise, negative for clockwise, zero when collinear.
#[must_use]
pub fn orientation(p1: Point2, p2: Point2, p3: Point2) -> f32 {
    (p2.y - p1.y) * (p3.x - p2.x) - (p2.x - p1.x) * (p3.y - p2.y)
}

/// Orientation of the ordered triplet at double precision.
#[must_use]
pub fn orientation_d(p1: Point2, p2: Point2, p3: Point2) -> f64 {
    orientation_dd(widen(p1), widen(p2), widen(p3))
}

/// Orientation of an already widened triplet.
#[must_use]
pub fn orientation_dd(p1: Point2D, p2: Point2D, p3: Point2D) -> f64 {
    (p2.y - p1.y) * (p3.x - p2.x) - (p2.x - p1.x) * (p3.y - p2.y)
}

/// Returns true if a single-precision orientation counts as collinear.
#[must_use]
pub fn collinear(orientation: f32) -> bool {
    orientation.abs() <= COLL_EPSILON
}

/// Returns true if a double-precision orientation counts as collinear.
#[must_use]
pub fn collinear_d(orientation: f64) -> bool {
    orientation.abs() <= COLL_EPSILON_D
}

#[must_use]
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

#[must_use]
pub fn approx_eq_d(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Component-wise point comparison with the single-precision [`EPSILON`].
#[must_use]
pub fn approx_point(a: Point2, b: Point2) -> bool {
    approx_eq(a.x, b.x, EPSILON) && approx_eq(a.y, b.y, EPSILON)
}

#[must_use]
pub fn approx_angle(a: f64, b: f64) -> bool {
    approx_eq_d(a, b, ANGLE_EPSILON)
}

/// Three-way comparison with the single-precision [`EPSILON`] as dead zone.
fn compare_approx(a: f32, b: f32) -> i8 {
    if approx_eq(a, b, EPSILON) {
        0
    } else if a < b {
        -1
    } else {
        1
    }
}

/// Checks if `p2` is a convex corner of a clockwise simple polygon,
/// where `p1` precedes and `p3` follows it.
#[must_use]
pub fn is_convex(p1: Point2, p2: Point2, p3: Point2) -> bool {
    orientation_d(p1, p2, p3) < -COLL_EPSILON_D
}

/// Checks if `p` lies strictly inside the clockwise angle from
/// `center -> angle_p1` to `center -> angle_p2`.
///
/// Assumes `angle_p1`, `angle_p2`, `center` are in counter-clockwise order.
#[must_use]
pub fn point_in_cw_angle(center: Point2, angle_p1: Point2, angle_p2: Point2, p: Point2) -> bool {
    let orientation1 = orientation_d(center, angle_p1, p);
    let orientation2 = orientation_d(center, angle_p2, p);
    if is_convex(angle_p2, center, angle_p1) {
        orientation1 < -COLL_EPSILON_D && orientation2 > COLL_EPSILON_D
    } else {
        // A reflex angle cannot be tested with two half-plane checks; negate the complement.
        orientation1 < -COLL_EPSILON_D || orientation2 > COLL_EPSILON_D
    }
}

/// For three collinear points, true if `center -> angle_p1` and
/// `center -> angle_p2` point the same way, false if they are opposite.
#[must_use]
pub fn is_vector_angle_0(center: Point2, angle_p1: Point2, angle_p2: Point2) -> bool {
    let cmp_x1 = compare_approx(center.x, angle_p1.x);
    let cmp_x2 = compare_approx(center.x, angle_p2.x);
    let cmp_y1 = compare_approx(center.y, angle_p1.y);
    let cmp_y2 = compare_approx(center.y, angle_p2.y);
    if (cmp_x1 == 0 && cmp_y1 == 0) || (cmp_x2 == 0 && cmp_y2 == 0) {
        return true;
    }
    cmp_x1 == cmp_x2 && cmp_y1 == cmp_y2
}

/// Strict betweenness at double precision; degenerate spans accept only their own value.
fn between_excl(start: f64, between: f64, end: f64) -> bool {
    if approx_eq_d(start, end, EPSILON_D) {
        return approx_eq_d(start, between, EPSILON_D);
    }
    let (lo, hi) = if end < start { (end, start) } else { (start, end) };
    between > lo + EPSILON_D && between < hi - EPSILON_D
}

fn between_incl(start: f32, between: f32, end: f32) -> bool {
    if approx_eq(start, end, EPSILON) {
        return approx_eq(start, between, EPSILON);
    }
    let (lo, hi) = if end < start { (end, start) } else { (start, end) };
    between >= lo && between <= hi
}

/// True if `between` lies strictly inside the axis-aligned span of the segment.
#[must_use]
pub fn on_segment_excl(start: Point2D, between: Point2D, end: Point2D) -> bool {
    between_excl(start.x, between.x, end.x) && between_excl(start.y, between.y, end.y)
}

/// True if `between` lies inside the axis-aligned span of the segment, endpoints included.
#[must_use]
pub fn on_segment_incl(start: Point2, between: Point2, end: Point2) -> bool {
    between_incl(start.x, between.x, end.x) && between_incl(start.y, between.y, end.y)
}

/// Winding test in the left-handed frame: true for clockwise outlines.
#[must_use]
pub fn is_polygon_clockwise(polygon: &[Point2]) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    let mut area = 0.0_f32;
    let mut prev = last;
    for &p in polygon {
        area += (p.x - prev.x) * (p.y + prev.y);
        prev = p;
    }
    area < 0.0
}
