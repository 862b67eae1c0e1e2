pub mod bbox;
pub mod intersect_2d;
pub mod orientation;

pub use bbox::Bbox;

/// 2D point type at storage precision (vertex coordinates, serialized values).
pub type Point2 = nalgebra::Point2<f32>;

/// 2D point type at predicate precision (orientation and intersection math).
pub type Point2D = nalgebra::Point2<f64>;

/// Largest coordinate magnitude the tolerances below are calibrated for.
pub const MAX_VALUE: f32 = 999_999.0;

/// [`MAX_VALUE`] at predicate precision.
pub const MAX_VALUE_D: f64 = 999_999.0;

/// Single-precision tolerance for point and distance comparisons.
pub const EPSILON: f32 = 0.1;

/// Single-precision collinearity tolerance, scaled to [`MAX_VALUE`].
pub const COLL_EPSILON: f32 = EPSILON / MAX_VALUE;

/// Double-precision tolerance for scalar comparisons.
pub const EPSILON_D: f64 = 1e-8;

/// Double-precision collinearity tolerance, scaled to [`MAX_VALUE`].
pub const COLL_EPSILON_D: f64 = EPSILON_D / MAX_VALUE_D;

/// Two angles closer than this belong to the same angular bucket.
pub const ANGLE_EPSILON: f64 = 1e-12;

/// Widens a storage-precision point for predicate evaluation.
#[inline]
#[must_use]
pub fn widen(p: Point2) -> Point2D {
    Point2D::new(f64::from(p.x), f64::from(p.y))
}

/// Narrows a predicate-precision point back to storage precision.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn narrow(p: Point2D) -> Point2 {
    Point2::new(p.x as f32, p.y as f32)
}

/// Sums the Euclidean segment lengths of a polyline in double precision.
#[must_use]
pub fn path_cost(path: &[Point2]) -> f64 {
    path.windows(2)
        .map(|pair| nalgebra::distance(&widen(pair[0]), &widen(pair[1])))
        .sum()
}
