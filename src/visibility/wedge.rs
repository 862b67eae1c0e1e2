use crate::math::Point2;

/// Boundary between two angular slices of a vertex's visibility polygon.
///
/// `aux` holds the id of the closest vertex bounding the slice, negated when
/// the blocking obstacle edge lies on the clockwise side of the ray. The
/// trailing split wedge of every list reuses `aux` as an index into the list
/// instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub intersection: Point2,
    pub aux: i32,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn to_aux(value: usize) -> i32 {
    value as i32
}

impl Wedge {
    #[must_use]
    pub fn new(intersection: Point2, aux: i32) -> Self {
        Self { intersection, aux }
    }

    /// Boundary whose blocking edge lies counter-clockwise of `closest`.
    #[must_use]
    pub fn ccw(intersection: Point2, closest: usize) -> Self {
        Self::new(intersection, to_aux(closest))
    }

    /// Boundary whose blocking edge lies clockwise of `closest`.
    #[must_use]
    pub fn cw(intersection: Point2, closest: usize) -> Self {
        Self::new(intersection, -to_aux(closest))
    }

    /// Sentinel closing a list; `index` is the last boundary under 180 degrees.
    #[must_use]
    pub fn split(opposite: Point2, index: usize) -> Self {
        Self::new(opposite, to_aux(index))
    }

    #[must_use]
    pub fn closest(&self) -> usize {
        self.aux.unsigned_abs() as usize
    }

    #[must_use]
    pub fn is_edge_on_cw_side(&self) -> bool {
        self.aux < 0
    }

    /// Split index stored in a sentinel wedge.
    #[must_use]
    pub fn split_index(&self) -> usize {
        self.closest()
    }
}
