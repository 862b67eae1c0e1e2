//! Rotational plane sweep.
//!
//! For one source point, rotates a ray around it and reports every vertex
//! the ray reaches before an obstacle edge, plus the angular wedges that make
//! up the source's visibility polygon. The status line holds the obstacle
//! edges the ray currently crosses, nearest first.

mod order;

use std::f64::consts::{PI, TAU};

use tracing::trace;

use crate::collections::StatusTree;
use crate::graph::Edge;
use crate::math::intersect_2d::half_line_to_line;
use crate::math::orientation::{
    approx_angle, ccw_angle, collinear_d, is_convex, on_segment_excl, orientation_d,
    point_in_cw_angle,
};
use crate::math::{widen, Bbox, Point2, ANGLE_EPSILON};
use crate::vertices::VertexView;
use crate::visibility::Wedge;

use order::{sort_by_angle, RayOrder};

/// Sweep behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Keep only taut edges between convex corners.
    pub reduced: bool,
    /// Record visibility wedges for later point queries.
    pub store_wedges: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            reduced: false,
            store_wedges: true,
        }
    }
}

/// Result of sweeping one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutput {
    /// Visible vertices in angular order.
    pub edges: Vec<Edge>,
    /// Wedge boundaries in angular order, closed by a split sentinel.
    /// Empty for sources outside every boundary or inside an obstacle.
    pub wedges: Vec<Wedge>,
    /// Bounds of the wedge intersections and the source.
    pub bbox: Bbox,
}

/// Closest vertices blocking the ray in the current angular bucket.
#[derive(Debug, Default)]
struct Blockers {
    ccw: Option<usize>,
    cw: Option<usize>,
    ccw_cw: Option<usize>,
    ccw_visible: bool,
    cw_visible: bool,
    ccw_cw_visible: bool,
}

/// Reusable sweep state. Buffers grow to the largest vertex set seen.
#[derive(Debug, Default)]
pub struct RotationalPlaneSweep {
    options: SweepOptions,
    angles: Vec<f64>,
    sq_dists: Vec<f32>,
    sorted: Vec<usize>,
    tree: StatusTree<usize>,
}

fn wrap_angle(angle: f64) -> f64 {
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

impl RotationalPlaneSweep {
    #[must_use]
    pub fn new(options: SweepOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> SweepOptions {
        self.options
    }

    /// Computes the vertices visible from `source` and, if enabled, its wedges.
    ///
    /// A polygon vertex only looks into the free side of its corner; a free
    /// point on an obstacle edge only looks off that edge; any other point
    /// looks all the way round.
    ///
    /// # Panics
    ///
    /// Panics if the status line loses an edge or an orientation is exactly
    /// zero without counting as collinear. Both indicate polygons that are not
    /// simple.
    pub fn sweep(&mut self, view: &VertexView<'_>, source: usize) -> SweepOutput {
        let p = view.point(source);
        let n = view.len();
        let store = self.options.store_wedges;
        let reduced = self.options.reduced;
        let is_p_poly = view.is_poly(source);

        self.angles.clear();
        self.angles.resize(n, 0.0);
        self.sq_dists.clear();
        self.sq_dists.resize(n, 0.0);
        self.sorted.clear();
        self.tree.clear();

        let mut out = SweepOutput {
            edges: Vec::new(),
            wedges: Vec::new(),
            bbox: Bbox::point(p),
        };

        let mut is_p_convex = true;
        let mut init_rho = Point2::new(crate::math::MAX_VALUE, p.y);
        let mut init_angle = 0.0;
        let mut stop_angle = TAU;
        if is_p_poly {
            is_p_convex = is_convex(view.prev_point(source), p, view.next_point(source));
            init_rho = view.next_point(source);
            init_angle = ccw_angle(p, init_rho);
            stop_angle = wrap_angle(ccw_angle(p, view.prev_point(source)) - init_angle);
        } else {
            for id in view.base().vertex_ids() {
                let vertex = view.point(id);
                let next = view.next_point(id);
                if collinear_d(orientation_d(vertex, p, next))
                    && on_segment_excl(widen(vertex), widen(p), widen(next))
                {
                    init_rho = next;
                    init_angle = ccw_angle(p, init_rho);
                    stop_angle = wrap_angle(ccw_angle(p, vertex) - init_angle);
                }
            }
        }
        stop_angle += ANGLE_EPSILON;

        let init_ray = RayOrder::new(p, init_rho);
        for id in 0..n {
            if id == source || view.is_descriptor(id) {
                continue;
            }
            let vertex = view.point(id);
            let angle = wrap_angle(ccw_angle(p, vertex) - init_angle);
            self.angles[id] = angle;
            if view.is_poly(id) && half_line_to_line(p, init_rho, vertex, view.next_point(id)).hit
            {
                self.tree.insert(id, |a, b| init_ray.compare(view, *a, *b));
            }
            if angle > stop_angle && vertex != p {
                continue;
            }
            self.sorted.push(id);
            self.sq_dists[id] = nalgebra::distance_squared(&p, &vertex);
        }

        // Corners coinciding with the source face into their own interior.
        for k in 0..self.sorted.len() {
            let id = self.sorted[k];
            if view.is_poly(id) && view.point(id) == p {
                let before = self.angles[view.prev(id)];
                let after = self.angles[view.next(id)];
                self.angles[id] = before + wrap_angle(after - before) * 0.5;
            }
        }

        sort_by_angle(&mut self.sorted, &self.angles, &self.sq_dists);

        let count = self.sorted.len();
        let mut intersection = Point2::new(f32::NAN, f32::NAN);
        let mut last_under_180 = None;
        let mut in_free_space = false;
        let mut exterior = false;
        let mut i = 0;
        while i < count {
            let mut blockers = Blockers::default();
            let mut prev_visible = true;
            let start = i;
            while self.modify_tree(view, p, i, false, &mut blockers) && i < count - 1 {
                i += 1;
            }
            let end = i;

            let mut intersect_sq = f32::MAX;
            if let Some(&nearest) = self.tree.min() {
                let crossing = view.line_to_edge(p, view.point(self.sorted[end]), nearest);
                intersection = crossing.point;
                if crossing.hit {
                    intersect_sq = nalgebra::distance_squared(&p, &intersection);
                }
            }

            let first_w = view.point(self.sorted[start]);
            i = start;
            while i <= end {
                if blockers.ccw_cw_visible {
                    break;
                }
                let w = view.point(self.sorted[i]);
                let prev_collinear = w != first_w;
                // Coincident vertices share one verdict.
                let same_start = i;
                let mut visible = true;
                loop {
                    visible &= self.is_visible(view, p, self.sorted[i], prev_visible, intersect_sq);
                    i += 1;
                    if i == count || view.point(self.sorted[i]) != w {
                        break;
                    }
                }

                for k in same_start..i {
                    let w_id = self.sorted[k];
                    let is_w_poly = view.is_poly(w_id);
                    in_free_space |= visible && is_w_poly;
                    if !(visible && (!prev_collinear || store || !reduced)) {
                        continue;
                    }
                    let is_w_convex = !is_w_poly
                        || is_convex(view.prev_point(w_id), w, view.next_point(w_id));
                    let taut = !reduced
                        || !is_p_poly
                        || (!view.base().is_in_non_taut_region(source, w)
                            && (!is_w_poly || !view.base().is_in_non_taut_region(w_id, p)));
                    if (!reduced || (!prev_collinear && is_w_convex && is_p_convex)) && taut {
                        out.edges.push(Edge::new(w_id, self.sq_dists[w_id].sqrt()));
                    }
                    if is_w_poly {
                        if !is_w_convex {
                            blockers.ccw_cw = Some(w_id);
                        }
                        if p == w {
                            blockers.cw = Some(w_id);
                            blockers.ccw = Some(w_id);
                            blockers.ccw_cw = Some(w_id);
                        }
                        // A vertex with obstacle edges on both sides stops the ray.
                        if blockers.ccw_cw == Some(w_id) {
                            intersection = w;
                            blockers.ccw_cw_visible = true;
                        }
                    }
                    if store {
                        if blockers.cw == Some(w_id) {
                            blockers.cw_visible = true;
                        }
                        if blockers.ccw == Some(w_id) {
                            blockers.ccw_visible = true;
                        }
                    }
                }
                prev_visible = visible;
            }

            exterior |= intersection.x.is_nan();
            if store && !exterior {
                if let Some(cw) = blockers.cw.filter(|_| blockers.cw_visible) {
                    if blockers.cw != blockers.ccw {
                        out.wedges.push(Wedge::cw(intersection, cw));
                    }
                }
                if let Some(ccw) = blockers.ccw.filter(|_| blockers.ccw_visible) {
                    out.wedges.push(Wedge::ccw(intersection, ccw));
                }
                out.bbox = out.bbox.enclose(intersection);
                if self.angles[self.sorted[start]] < PI - ANGLE_EPSILON {
                    if let Some(last) = out.wedges.len().checked_sub(1) {
                        last_under_180 = Some(last);
                    }
                }
            }

            for k in start..=end {
                self.modify_tree(view, p, k, true, &mut blockers);
            }
            i = end + 1;
        }

        self.tree.clear();
        self.sorted.clear();

        if !in_free_space {
            trace!(x = p.x, y = p.y, "sweep source is inside an obstacle");
            out.edges.clear();
            out.wedges.clear();
            out.bbox = Bbox::point(p);
            return out;
        }
        if exterior {
            out.wedges.clear();
        } else if store {
            let Some(split) = last_under_180 else {
                panic!(
                    "no visibility wedge below 180 degrees around ({}, {})",
                    p.x, p.y
                );
            };
            out.wedges.push(Wedge::split(p - (init_rho - p), split));
        }
        out
    }

    fn is_visible(
        &self,
        view: &VertexView<'_>,
        p: Point2,
        w_id: usize,
        prev_visible: bool,
        intersect_sq: f32,
    ) -> bool {
        // The segment may enter the interior of w's own polygon.
        if view.is_poly(w_id)
            && point_in_cw_angle(
                view.point(w_id),
                view.next_point(w_id),
                view.prev_point(w_id),
                p,
            )
        {
            return false;
        }
        prev_visible && self.sq_dists[w_id] <= intersect_sq
    }

    /// Removes (or inserts) the obstacle edges incident to `sorted[i]` that end
    /// (or begin) at its angle. Returns whether the next vertex shares the angle.
    fn modify_tree(
        &mut self,
        view: &VertexView<'_>,
        p: Point2,
        i: usize,
        insert: bool,
        blockers: &mut Blockers,
    ) -> bool {
        let w_id = self.sorted[i];
        let next_collinear = i + 1 < self.sorted.len()
            && approx_angle(self.angles[w_id], self.angles[self.sorted[i + 1]]);
        if !view.is_poly(w_id) {
            return next_collinear;
        }
        let ray = RayOrder::new(p, view.point(w_id));
        let before = self.modify_edge(view, &ray, w_id, view.prev(w_id), insert, blockers);
        let after = self.modify_edge(view, &ray, w_id, w_id, insert, blockers);
        if self.options.store_wedges
            && blockers.ccw_cw.is_none()
            && before + after == 0
            && before != 0
        {
            blockers.ccw_cw = Some(w_id);
        }
        next_collinear
    }

    /// Handles obstacle edge `edge` incident to `w_id`. Returns +1 if it lies
    /// counter-clockwise of the ray, -1 if clockwise, 0 if along it.
    fn modify_edge(
        &mut self,
        view: &VertexView<'_>,
        ray: &RayOrder,
        w_id: usize,
        edge: usize,
        insert: bool,
        blockers: &mut Blockers,
    ) -> i8 {
        let other = if edge == w_id { view.next(w_id) } else { edge };
        let w = view.point(w_id);
        let orientation = orientation_d(ray.source, w, view.point(other));
        if collinear_d(orientation) {
            return 0;
        }
        let store = self.options.store_wedges;
        if orientation > 0.0 {
            if insert {
                self.tree.insert(edge, |a, b| ray.compare(view, *a, *b));
            }
            if store && blockers.ccw.is_none() {
                blockers.ccw = Some(w_id);
            }
            1
        } else if orientation < 0.0 {
            if !insert && !approx_angle(self.angles[w_id], 0.0) {
                let removed = self.tree.remove(&edge, |a, b| ray.compare(view, *a, *b));
                assert!(
                    removed,
                    "status line lost obstacle edge {edge} at ({}, {}) while sweeping from ({}, {})",
                    w.x, w.y, ray.source.x, ray.source.y
                );
            }
            if store && blockers.cw.is_none() {
                blockers.cw = Some(w_id);
            }
            -1
        } else {
            panic!(
                "orientation of ({}, {}) -> ({}, {}) is exactly zero yet not collinear",
                ray.source.x, ray.source.y, w.x, w.y
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::orientation::approx_point;
    use crate::test_support::fixture_vertices;
    use approx::assert_relative_eq;

    fn sweep_fixture(options: SweepOptions) -> (crate::vertices::VisVertices, SweepOutput) {
        let vs = fixture_vertices();
        assert_eq!(vs.point(2), Point2::new(60.0, 50.0));
        let out = RotationalPlaneSweep::new(options).sweep(&VertexView::polygons_only(&vs), 2);
        (vs, out)
    }

    fn targets(vs: &crate::vertices::VisVertices, out: &SweepOutput) -> Vec<(f32, f32)> {
        out.edges
            .iter()
            .map(|e| {
                let p = vs.point(e.to);
                (p.x, p.y)
            })
            .collect()
    }

    #[test]
    fn full_sweep_from_box_corner() {
        let (vs, out) = sweep_fixture(SweepOptions {
            reduced: false,
            store_wedges: false,
        });
        assert_eq!(
            targets(&vs, &out),
            vec![
                (60.0, 60.0),
                (60.0, 70.0),
                (65.0, 65.0),
                (100.0, 100.0),
                (100.0, 0.0),
                (70.0, 20.0),
                (64.0, 18.0),
                (60.0, 30.0),
                (60.0, 25.0),
                (60.0, 20.0),
                (60.0, 16.0),
                (60.0, 10.0),
                (55.0, 40.0),
                (50.0, 40.0),
                (0.0, 0.0),
                (50.0, 50.0),
            ]
        );
        assert!(out.wedges.is_empty());
        let first = out.edges[0];
        assert_relative_eq!(first.cost, 10.0);
    }

    #[test]
    fn reduced_sweep_from_box_corner() {
        let (vs, out) = sweep_fixture(SweepOptions {
            reduced: true,
            store_wedges: false,
        });
        assert_eq!(
            targets(&vs, &out),
            vec![
                (60.0, 60.0),
                (65.0, 65.0),
                (60.0, 30.0),
                (50.0, 40.0),
                (50.0, 50.0),
            ]
        );
    }

    fn assert_wedges(vs: &crate::vertices::VisVertices, out: &SweepOutput) {
        let expected = [
            ((60.0, 60.0), (60.0, 70.0)),
            ((60.0, 70.0), (60.0, 70.0)),
            ((65.0, 65.0), (76.0 + 2.0 / 3.0, 100.0)),
            ((100.0, 100.0), (100.0, 100.0)),
            ((100.0, 0.0), (100.0, 0.0)),
            ((70.0, 20.0), (76.0 + 2.0 / 3.0, 0.0)),
            ((64.0, 18.0), (64.444_444, 14.444_444)),
            ((60.0, 16.0), (60.0, 0.0)),
            ((60.0, 30.0), (60.0, 0.0)),
            ((55.0, 40.0), (55.0, 40.0)),
            ((50.0, 40.0), (10.0, 0.0)),
            ((0.0, 0.0), (0.0, 0.0)),
            ((50.0, 50.0), (0.0, 50.0)),
        ];
        assert_eq!(out.wedges.len(), expected.len() + 1);
        for (wedge, ((cx, cy), (ix, iy))) in out.wedges.iter().zip(expected) {
            assert!(approx_point(vs.point(wedge.closest()), Point2::new(cx, cy)));
            assert!(
                approx_point(wedge.intersection, Point2::new(ix, iy)),
                "wedge at ({cx}, {cy}) has intersection {:?}",
                wedge.intersection
            );
        }
        let split = out.wedges[expected.len()];
        assert_eq!(split.split_index(), 6);
        assert!(approx_point(split.intersection, Point2::new(60.0, 40.0)));
    }

    #[test]
    fn wedges_from_box_corner() {
        for reduced in [false, true] {
            let (vs, out) = sweep_fixture(SweepOptions {
                reduced,
                store_wedges: true,
            });
            assert_wedges(&vs, &out);
            assert_eq!(out.bbox, Bbox::new(0.0, 0.0, 100.0, 100.0));
        }
    }

    #[test]
    fn source_inside_obstacle_sees_nothing() {
        let vs = fixture_vertices();
        let extras = [Point2::new(55.0, 55.0)];
        let view = VertexView::new(&vs, &extras);
        let out = RotationalPlaneSweep::new(SweepOptions::default()).sweep(&view, vs.len());
        assert!(out.edges.is_empty());
        assert!(out.wedges.is_empty());
        assert_eq!(out.bbox, Bbox::point(Point2::new(55.0, 55.0)));
    }

    #[test]
    fn source_outside_boundary_sees_nothing() {
        let vs = fixture_vertices();
        let extras = [Point2::new(150.0, 50.0)];
        let view = VertexView::new(&vs, &extras);
        let out = RotationalPlaneSweep::new(SweepOptions::default()).sweep(&view, vs.len());
        assert!(out.edges.is_empty());
        assert!(out.wedges.is_empty());
    }

    #[test]
    fn free_point_sees_other_free_point() {
        let vs = fixture_vertices();
        let extras = [Point2::new(30.0, 35.0), Point2::new(35.0, 30.0)];
        let view = VertexView::new(&vs, &extras);
        let out = RotationalPlaneSweep::new(SweepOptions::default()).sweep(&view, vs.len());
        assert!(out.edges.iter().any(|e| e.to == vs.len() + 1));
        // (0,0) and (0,100) are unobstructed from the open left half.
        let corner = vs.find_vertex(Point2::new(0.0, 0.0)).unwrap();
        assert!(out.edges.iter().any(|e| e.to == corner));
    }

    #[test]
    fn repeated_sweeps_reuse_buffers() {
        let vs = fixture_vertices();
        let view = VertexView::polygons_only(&vs);
        let mut sweep = RotationalPlaneSweep::new(SweepOptions::default());
        let first = sweep.sweep(&view, 2);
        let corner = vs.find_vertex(Point2::new(100.0, 100.0)).unwrap();
        let other = sweep.sweep(&view, corner);
        assert_ne!(first, other);
        assert_eq!(sweep.sweep(&view, 2), first);
    }

    #[test]
    fn visibility_is_symmetric_between_corners() {
        let polygons = vec![
            vec![
                Point2::new(20.0, 20.0),
                Point2::new(40.0, 25.0),
                Point2::new(35.0, 45.0),
                Point2::new(15.0, 40.0),
            ],
            vec![
                Point2::new(60.0, 55.0),
                Point2::new(85.0, 60.0),
                Point2::new(75.0, 80.0),
            ],
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 100.0),
                Point2::new(100.0, 100.0),
                Point2::new(100.0, 0.0),
            ],
        ];
        let vs = crate::vertices::VisVertices::from_polygons(&polygons).unwrap();
        let view = VertexView::polygons_only(&vs);
        let mut sweep = RotationalPlaneSweep::new(SweepOptions {
            reduced: false,
            store_wedges: false,
        });
        let visible: Vec<Vec<usize>> = (0..vs.len())
            .map(|id| {
                if vs.is_descriptor(id) {
                    Vec::new()
                } else {
                    sweep.sweep(&view, id).edges.iter().map(|e| e.to).collect()
                }
            })
            .collect();
        for a in vs.vertex_ids() {
            for &b in &visible[a] {
                assert!(
                    visible[b].contains(&a),
                    "{:?} sees {:?} but not the reverse",
                    vs.point(a),
                    vs.point(b)
                );
            }
        }
        // Opposite corners of the quad see each other only around the outside.
        let a = vs.find_vertex(Point2::new(20.0, 20.0)).unwrap();
        let c = vs.find_vertex(Point2::new(35.0, 45.0)).unwrap();
        assert!(!visible[a].contains(&c));
    }
}
