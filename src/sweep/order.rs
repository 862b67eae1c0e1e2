use std::cmp::Ordering;

use crate::math::intersect_2d::line_to_line;
use crate::math::orientation::{approx_angle, approx_eq, approx_point};
use crate::math::{Point2, EPSILON};
use crate::vertices::VertexView;

/// Ordering of obstacle edges by where a ray from `source` through `through`
/// meets them.
///
/// Built fresh for every vertex the sweep processes and passed into each
/// status-line call, so a stale ray can never order the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RayOrder {
    pub source: Point2,
    pub through: Point2,
}

impl RayOrder {
    pub fn new(source: Point2, through: Point2) -> Self {
        Self { source, through }
    }

    fn hit_distance(&self, view: &VertexView<'_>, edge: usize) -> (f32, Point2) {
        let crossing = view.line_to_edge(self.source, self.through, edge);
        (
            nalgebra::distance_squared(&self.source, &crossing.point),
            crossing.point,
        )
    }

    /// Compares edges `e1` and `e2` (each named by its start vertex).
    ///
    /// Edges meeting the ray at the same point share an endpoint there; they
    /// are then ordered by which one hides the other's far endpoint.
    pub fn compare(&self, view: &VertexView<'_>, e1: usize, e2: usize) -> Ordering {
        let (mut d1, hit1) = self.hit_distance(view, e1);
        let (mut d2, hit2) = self.hit_distance(view, e2);
        if approx_eq(d1, d2, EPSILON) {
            let (a1, a2) = (view.point(e1), view.next_point(e1));
            let (b1, b2) = (view.point(e2), view.next_point(e2));
            let far_a = if approx_point(a1, hit1) { a2 } else { a1 };
            let far_b = if approx_point(b1, hit2) { b2 } else { b1 };
            let towards_b = line_to_line(self.source, far_b, a1, a2);
            if towards_b.hit {
                d1 = nalgebra::distance_squared(&self.source, &towards_b.point);
                d2 = nalgebra::distance_squared(&self.source, &far_b);
            } else {
                let towards_a = line_to_line(self.source, far_a, b1, b2);
                d1 = nalgebra::distance_squared(&self.source, &far_a);
                d2 = nalgebra::distance_squared(&self.source, &towards_a.point);
            }
        }
        compare_nan_first(d1, d2)
    }
}

/// Float comparison that orders NaN below every number.
fn compare_nan_first(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| b.is_nan().cmp(&a.is_nan()))
}

/// Sorts vertex ids by angle, then squared distance, then id.
///
/// Angles within [`crate::math::ANGLE_EPSILON`] of their neighbour form one
/// bucket; inside a bucket only distance and id decide. Bucketing chains, so
/// a long run of nearly equal angles stays one bucket.
pub(crate) fn sort_by_angle(ids: &mut [usize], angles: &[f64], sq_dists: &[f32]) {
    ids.sort_unstable_by(|&a, &b| angles[a].total_cmp(&angles[b]).then(a.cmp(&b)));
    let mut start = 0;
    while start < ids.len() {
        let mut end = start + 1;
        while end < ids.len() && approx_angle(angles[ids[end - 1]], angles[ids[end]]) {
            end += 1;
        }
        ids[start..end]
            .sort_unstable_by(|&a, &b| sq_dists[a].total_cmp(&sq_dists[b]).then(a.cmp(&b)));
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ANGLE_EPSILON;
    use crate::test_support::fixture_vertices;

    #[test]
    fn sort_groups_nearly_equal_angles() {
        let angles = [0.5, 0.1, 0.1 + ANGLE_EPSILON / 2.0, 0.1, 0.3];
        let dists = [1.0, 9.0, 4.0, 4.0, 1.0];
        let mut ids = vec![0, 1, 2, 3, 4];
        sort_by_angle(&mut ids, &angles, &dists);
        // Bucket {1,2,3} by distance then id, then 4, then 0.
        assert_eq!(ids, vec![2, 3, 1, 4, 0]);
    }

    #[test]
    fn nearer_edge_orders_first() {
        let vs = fixture_vertices();
        let view = VertexView::polygons_only(&vs);
        let ray = RayOrder::new(Point2::new(55.0, 45.0), Point2::new(55.0, 100.0));
        // Box edge (60,60)->(50,60) against boundary edge (0,100)->(100,100).
        let box_bottom = vs.find_vertex(Point2::new(60.0, 60.0)).unwrap_or_default();
        let boundary_top = vs.find_vertex(Point2::new(0.0, 100.0)).unwrap_or_default();
        assert_eq!(ray.compare(&view, box_bottom, boundary_top), Ordering::Less);
        assert_eq!(ray.compare(&view, boundary_top, box_bottom), Ordering::Greater);
    }

    #[test]
    fn shared_endpoint_resolved_by_far_ends() {
        let vs = fixture_vertices();
        let view = VertexView::polygons_only(&vs);
        // The ray grazes box corner (50,50); both incident edges lie on the
        // same side of it and the left edge hides the top one.
        let ray = RayOrder::new(Point2::new(40.0, 55.0), Point2::new(50.0, 50.0));
        let left = vs.find_vertex(Point2::new(50.0, 60.0)).unwrap_or_default();
        let top = vs.find_vertex(Point2::new(50.0, 50.0)).unwrap_or_default();
        assert_eq!(ray.compare(&view, left, top), Ordering::Less);
        assert_eq!(ray.compare(&view, top, left), Ordering::Greater);
    }

    #[test]
    fn nan_orders_first() {
        assert_eq!(compare_nan_first(f32::NAN, 1.0), Ordering::Less);
        assert_eq!(compare_nan_first(1.0, f32::NAN), Ordering::Greater);
        assert_eq!(compare_nan_first(f32::NAN, f32::NAN), Ordering::Equal);
    }
}
