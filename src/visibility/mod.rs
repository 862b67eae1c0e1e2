//! Point visibility against a vertex's stored wedges.
//!
//! A wedge list is the visibility polygon of one vertex split into angular
//! slices. Consecutive boundaries bound a triangle (fan slice) that is free
//! space; whatever lies beyond its far side is blocked. Queries binary search
//! the slices instead of sweeping again.

mod wedge;

pub use wedge::Wedge;

use bitflags::bitflags;

use crate::math::orientation::{
    approx_point, collinear_d, is_vector_angle_0, on_segment_incl, orientation_d,
    point_in_cw_angle,
};
use crate::math::{Point2, COLL_EPSILON_D, EPSILON};
use crate::vertices::VisVertices;

bitflags! {
    /// Where a point lies relative to one wedge slice.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct WedgeOrientation: u8 {
        /// On or beyond the counter-clockwise boundary.
        const CCW = 0b0001;
        /// On or beyond the clockwise boundary.
        const CW = 0b0010;
        /// Within the angle between both boundaries.
        const IN_ANGLE = 0b0100;
        /// Within the free triangle of the slice.
        const IN_TRI = 0b1000;
    }
}

/// Outcome of [`point_visibility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointVisibility {
    pub visible: bool,
    /// Clockwise boundary of the slice that decided the query, if any.
    pub wedge: Option<usize>,
    pub orientation: WedgeOrientation,
}

impl PointVisibility {
    fn new(visible: bool, wedge: Option<usize>, orientation: WedgeOrientation) -> Self {
        Self {
            visible,
            wedge,
            orientation,
        }
    }
}

/// Corners of the slice between `cw` and `ccw`, as `(cw_corner, ccw_corner)`.
///
/// A boundary contributes its closest vertex when the slice touches that
/// vertex's obstacle edge, otherwise its far intersection.
fn slice_corners(vertices: &VisVertices, cw: Wedge, ccw: Wedge) -> (Point2, Point2) {
    let mut cw_corner = vertices.point(cw.closest());
    let mut ccw_corner = vertices.point(ccw.closest());
    let edge_on_cw_side = ccw.intersection == ccw_corner || ccw.is_edge_on_cw_side();
    let edge_on_ccw_side = cw.intersection == cw_corner || !cw.is_edge_on_cw_side();
    if edge_on_cw_side && edge_on_ccw_side {
        return (cw_corner, ccw_corner);
    }
    if edge_on_cw_side || !edge_on_ccw_side {
        cw_corner = cw.intersection;
    }
    if edge_on_ccw_side || !edge_on_cw_side {
        ccw_corner = ccw.intersection;
    }
    (cw_corner, ccw_corner)
}

/// Classifies `p` against the slice between `cw` and `ccw` seen from `center`.
///
/// The clockwise angle from `cw` to `ccw` must be under 180 degrees, and `p`
/// must lie on the same side of the list's split line as both boundaries for
/// the CW/CCW answer to steer a binary search. `p == center` is not handled.
#[must_use]
pub fn compare_wedge_point(
    vertices: &VisVertices,
    cw: Wedge,
    ccw: Wedge,
    center: Point2,
    p: Point2,
) -> WedgeOrientation {
    let (cw_corner, ccw_corner) = slice_corners(vertices, cw, ccw);
    let mut status = WedgeOrientation::empty();
    let o1 = orientation_d(center, ccw_corner, p);
    if collinear_d(o1) {
        status |= WedgeOrientation::CCW;
    } else if o1 > 0.0 {
        return WedgeOrientation::CCW;
    }
    let o2 = orientation_d(center, cw_corner, p);
    if collinear_d(o2) {
        status |= WedgeOrientation::CW;
    } else if o2 < 0.0 {
        return WedgeOrientation::CW;
    }
    // Degenerate slice: both corners and p on one line through center.
    if status == WedgeOrientation::CCW | WedgeOrientation::CW
        && is_vector_angle_0(center, ccw_corner, cw_corner)
    {
        let reference = if approx_point(center, ccw_corner) {
            cw_corner
        } else {
            ccw_corner
        };
        if !is_vector_angle_0(center, reference, p) {
            return status;
        }
        status |= WedgeOrientation::IN_ANGLE;
        if on_segment_incl(center, p, ccw_corner) || on_segment_incl(center, p, cw_corner) {
            status |= WedgeOrientation::IN_TRI;
        }
        return status;
    }
    status |= WedgeOrientation::IN_ANGLE;
    if orientation_d(ccw_corner, cw_corner, p) < COLL_EPSILON_D {
        status |= WedgeOrientation::IN_TRI;
    }
    status
}

fn decided(orientation: WedgeOrientation) -> bool {
    !orientation.intersects(WedgeOrientation::CW | WedgeOrientation::CCW)
}

/// Tests whether `p` is visible from vertex `center_id` given its wedge list.
///
/// An empty list means the vertex lies outside the level and sees nothing.
#[must_use]
pub fn point_visibility(
    vertices: &VisVertices,
    wedges: &[Wedge],
    center_id: usize,
    p: Point2,
) -> PointVisibility {
    let center = vertices.point(center_id);
    if approx_point(center, p) {
        return PointVisibility::new(true, Some(0), WedgeOrientation::all());
    }
    let len = wedges.len();
    if len < 2 {
        return PointVisibility::new(false, None, WedgeOrientation::empty());
    }
    // The obstacle's own interior angle.
    if point_in_cw_angle(
        center,
        wedges[0].intersection,
        wedges[len - 2].intersection,
        p,
    ) {
        return PointVisibility::new(
            false,
            Some(len - 2),
            WedgeOrientation::IN_ANGLE | WedgeOrientation::IN_TRI,
        );
    }

    let split_wedge = wedges[len - 1];
    let split = split_wedge.split_index();
    // The slice straddling the split line.
    let mut orientation = if split + 1 < len - 1 {
        compare_wedge_point(vertices, wedges[split], wedges[split + 1], center, p)
    } else {
        WedgeOrientation::empty()
    };
    if orientation.contains(WedgeOrientation::IN_ANGLE) {
        if orientation.contains(WedgeOrientation::IN_TRI) {
            return PointVisibility::new(true, Some(split), orientation);
        }
        if decided(orientation) {
            return PointVisibility::new(false, Some(split), orientation);
        }
    }

    let init = orientation_d(center, split_wedge.intersection, p);
    let (mut low, mut high) = if init < -COLL_EPSILON_D
        || (collinear_d(init) && !is_vector_angle_0(center, split_wedge.intersection, p))
    {
        (0, split.checked_sub(1))
    } else {
        (split + 1, len.checked_sub(3))
    };
    let mut index = len - 2;
    let sq_dist = nalgebra::distance_squared(&center, &p) - EPSILON;
    while let Some(h) = high.filter(|&h| low <= h) {
        let mid = (low + h) / 2;
        index = mid;
        let cw = wedges[mid];
        let ccw = wedges[mid + 1];
        orientation = compare_wedge_point(vertices, cw, ccw, center, p);
        if orientation.contains(WedgeOrientation::IN_TRI) {
            return PointVisibility::new(true, Some(index), orientation);
        }
        if decided(orientation) {
            return PointVisibility::new(false, Some(index), orientation);
        }
        if orientation.contains(WedgeOrientation::CCW) {
            low = mid + 1;
            if mid != len - 3 && orientation.contains(WedgeOrientation::IN_ANGLE) {
                index = low;
                // On the boundary shared with the next slice.
                let (next_cw, _) = slice_corners(vertices, ccw, wedges[mid + 2]);
                if sq_dist <= nalgebra::distance_squared(&center, &next_cw) {
                    return PointVisibility::new(true, Some(index), orientation);
                }
                low = h + 1;
            }
        }
        if orientation.contains(WedgeOrientation::CW) {
            high = mid.checked_sub(1);
            if mid != 0 && orientation.contains(WedgeOrientation::IN_ANGLE) {
                index = mid - 1;
                let (_, prev_ccw) = slice_corners(vertices, wedges[mid - 1], cw);
                let visible = sq_dist <= nalgebra::distance_squared(&center, &prev_ccw);
                return PointVisibility::new(visible, Some(index), orientation);
            }
        }
    }
    PointVisibility::new(false, Some(index), orientation)
}

/// Shorthand for [`point_visibility`] returning only the verdict.
#[must_use]
pub fn is_point_visible(
    vertices: &VisVertices,
    wedges: &[Wedge],
    center_id: usize,
    p: Point2,
) -> bool {
    point_visibility(vertices, wedges, center_id, p).visible
}
