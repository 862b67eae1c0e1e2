//! Line and half-line intersection against segments.

use super::orientation::{approx_eq_d, on_segment_excl};
use super::{narrow, widen, Point2, COLL_EPSILON_D, EPSILON_D};

/// Result of intersecting a line (or half-line) with a segment.
///
/// `point` is where the supporting lines meet and is meaningful even when
/// `hit` is false; it is NaN only for parallel inputs.
#[derive(Debug, Clone, Copy)]
pub struct LineCrossing {
    pub hit: bool,
    pub point: Point2,
}

impl LineCrossing {
    fn parallel() -> Self {
        Self {
            hit: false,
            point: Point2::new(f32::NAN, f32::NAN),
        }
    }
}

/// Intersects segment `a1 -> a2` with segment `b1 -> b2`.
///
/// Hits within [`COLL_EPSILON_D`] of either end of `a` and touches at the ends
/// of `b` do not count.
#[must_use]
pub fn line_to_line(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> LineCrossing {
    crossing(a1, a2, b1, b2, false)
}

/// Intersects the half-line from `a1` through `a2` with segment `b1 -> b2`.
#[must_use]
pub fn half_line_to_line(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> LineCrossing {
    crossing(a1, a2, b1, b2, true)
}

fn crossing(a1: Point2, a2: Point2, b1: Point2, b2: Point2, half_line: bool) -> LineCrossing {
    let (a1, a2, b1, b2) = (widen(a1), widen(a2), widen(b1), widen(b2));
    let b = a2 - a1;
    let d = b2 - b1;
    let perp = b.x * d.y - b.y * d.x;
    if approx_eq_d(perp, 0.0, EPSILON_D) {
        return LineCrossing::parallel();
    }

    let c = b1 - a1;
    let t = (c.x * d.y - c.y * d.x) / perp;
    let point = a1 + b * t;
    let along = t > COLL_EPSILON_D && (half_line || t < 1.0 - COLL_EPSILON_D);
    LineCrossing {
        hit: along && on_segment_excl(b1, point, b2),
        point: narrow(point),
    }
}
