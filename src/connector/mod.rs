//! Strategies for attaching query points to a visibility graph.
//!
//! A connector computes the edges of an overlay's start or goal. The goal is
//! always connected first; connecting it also records the edges from base
//! vertices back to it, and connecting the start may add a direct edge.

mod dfs;
mod plane_sweep;

pub use dfs::{DfsConfig, DfsVgConnector};
pub use plane_sweep::PlaneSweepConnector;

use crate::graph::{QueryEnd, QueryOverlay};
use crate::visibility::is_point_visible;

pub trait Connector {
    /// Computes the edges of `end` and stores them in `overlay`.
    ///
    /// Returns `false` if no vertex is visible, meaning the point is enclosed
    /// by an obstacle.
    fn connect(&mut self, overlay: &mut QueryOverlay<'_>, end: QueryEnd) -> bool;

    /// Line of sight between two overlay ids, for any-angle search.
    ///
    /// Connectors that cannot answer cheaply report `false`, which makes
    /// Theta* fall back to graph edges.
    fn line_of_sight(&self, _overlay: &QueryOverlay<'_>, _from: usize, _to: usize) -> bool {
        false
    }
}

/// Visibility between two overlay ids, answered from whichever end has wedges.
///
/// Two query points see each other only through the direct edge.
fn sees(overlay: &QueryOverlay<'_>, from: usize, to: usize) -> bool {
    let graph = overlay.graph();
    let (center, target) = if overlay.is_base(from) {
        (from, to)
    } else if overlay.is_base(to) {
        (to, from)
    } else {
        return overlay.has_direct_edge();
    };
    graph.wedges(center).is_some_and(|wedges| {
        is_point_visible(graph.vertices(), wedges, center, overlay.point_of(target))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ConnectorError, VisGraphError};
    use crate::graph::{GraphBuilder, VisibilityGraph};
    use crate::math::{path_cost, Point2};
    use crate::search::{Pathfinder, SearchStrategy};
    use crate::sweep::SweepOptions;
    use crate::test_support::{fixture_graph, init_tracing};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const FULL: SweepOptions = SweepOptions {
        reduced: false,
        store_wedges: true,
    };
    const REDUCED: SweepOptions = SweepOptions {
        reduced: true,
        store_wedges: true,
    };

    const PAIRS: [((f32, f32), (f32, f32)); 9] = [
        ((30.0, 35.0), (70.0, 80.0)),
        ((55.0, 55.0), (58.0, 52.0)),
        ((29.4, 83.9), (82.3, 53.0)),
        ((61.5, 58.8), (90.8, 36.0)),
        ((98.5, 3.6), (33.2, 3.4)),
        ((84.2, 56.8), (64.5, 51.6)),
        ((0.5, 36.0), (85.0, 6.2)),
        ((76.0, 14.0), (2.3, 95.5)),
        ((89.7, 58.1), (53.0, 28.6)),
    ];

    fn pt((x, y): (f32, f32)) -> Point2 {
        Point2::new(x, y)
    }

    fn sorted(mut points: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
        points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        points
    }

    fn edge_points(overlay: &QueryOverlay<'_>, end: QueryEnd) -> Vec<(f32, f32)> {
        sorted(
            overlay
                .edges_of(end)
                .iter()
                .map(|edge| {
                    let p = overlay.point_of(edge.to);
                    (p.x, p.y)
                })
                .collect(),
        )
    }

    fn dfs_connector(graph: &VisibilityGraph, reduced: bool) -> DfsVgConnector {
        let config = DfsConfig {
            full_graph: !reduced,
            ..DfsConfig::default()
        };
        DfsVgConnector::new(graph, config).unwrap()
    }

    fn assert_same_edges(graph: &VisibilityGraph, start: Point2, goal: Point2) {
        let mut sweep = PlaneSweepConnector::new(false);
        let mut dfs = dfs_connector(graph, false);
        let expected = graph.connect(&mut sweep, start, goal);
        let actual = graph.connect(&mut dfs, start, goal);
        match (expected, actual) {
            (Some(expected), Some(actual)) => {
                for end in [QueryEnd::Start, QueryEnd::Goal] {
                    assert_eq!(
                        edge_points(&expected, end),
                        edge_points(&actual, end),
                        "{end:?} edges of {start:?} -> {goal:?}"
                    );
                }
                assert_eq!(
                    expected.goal_back_edge_count(),
                    actual.goal_back_edge_count()
                );
            }
            (None, None) => {}
            (expected, actual) => panic!(
                "{start:?} -> {goal:?}: sweep connected {}, dfs connected {}",
                expected.is_some(),
                actual.is_some()
            ),
        }
    }

    fn assert_same_costs(graph: &VisibilityGraph, reduced: bool, pairs: &[(Point2, Point2)]) {
        let mut sweep = PlaneSweepConnector::new(reduced);
        let mut dfs = dfs_connector(graph, reduced);
        let mut pathfinder = Pathfinder::new(SearchStrategy::AStar);
        for &(start, goal) in pairs {
            let expected = graph.find_path(&mut sweep, &mut pathfinder, start, goal);
            let actual = graph.find_path(&mut dfs, &mut pathfinder, start, goal);
            match (expected, actual) {
                (Some(expected), Some(actual)) => {
                    let (a, b) = (path_cost(&expected), path_cost(&actual));
                    assert!(
                        (a - b).abs() < 0.1,
                        "{start:?} -> {goal:?}: sweep {a}, dfs {b}"
                    );
                }
                (None, None) => {}
                (expected, actual) => panic!(
                    "{start:?} -> {goal:?}: sweep found {}, dfs found {}",
                    expected.is_some(),
                    actual.is_some()
                ),
            }
        }
    }

    fn fixed_pairs() -> Vec<(Point2, Point2)> {
        PAIRS.iter().map(|&(s, g)| (pt(s), pt(g))).collect()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn random_pairs(count: usize) -> Vec<(Point2, Point2)> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut coordinate = || {
            let value: f64 = rng.random_range(0.0..100.0);
            ((value * 100.0).trunc() / 100.0) as f32
        };
        (0..count)
            .map(|_| {
                let start = Point2::new(coordinate(), coordinate());
                let goal = Point2::new(coordinate(), coordinate());
                (start, goal)
            })
            .collect()
    }

    #[test]
    fn both_connectors_find_known_edges() {
        init_tracing();
        let graph = fixture_graph(FULL);
        let start_expected = sorted(vec![
            (60.0, 25.0),
            (55.0, 25.0),
            (60.0, 20.0),
            (64.0, 18.0),
            (60.0, 16.0),
            (60.0, 10.0),
            (0.0, 0.0),
            (0.0, 100.0),
            (55.0, 75.0),
            (50.0, 60.0),
            (50.0, 50.0),
            (60.0, 50.0),
            (50.0, 40.0),
            (60.0, 30.0),
            (70.0, 26.0),
        ]);
        let goal_expected = sorted(vec![
            (100.0, 0.0),
            (70.0, 20.0),
            (70.0, 10.0),
            (64.0, 16.0),
            (64.0, 18.0),
            (60.0, 16.0),
            (60.0, 20.0),
            (60.0, 25.0),
            (55.0, 25.0),
            (60.0, 30.0),
            (55.0, 40.0),
            (0.0, 100.0),
            (50.0, 50.0),
            (60.0, 50.0),
            (60.0, 60.0),
            (60.0, 70.0),
            (65.0, 65.0),
            (65.0, 75.0),
            (100.0, 100.0),
            (30.0, 28.0),
        ]);
        let (start, goal) = (Point2::new(30.0, 28.0), Point2::new(70.0, 26.0));

        let mut sweep = PlaneSweepConnector::new(false);
        let mut dfs = dfs_connector(&graph, false);
        let connectors: [&mut dyn Connector; 2] = [&mut sweep, &mut dfs];
        for connector in connectors {
            let overlay = graph.connect(connector, start, goal).unwrap();
            assert_eq!(edge_points(&overlay, QueryEnd::Start), start_expected);
            assert_eq!(edge_points(&overlay, QueryEnd::Goal), goal_expected);
            assert!(overlay.has_direct_edge());
            assert_eq!(overlay.goal_back_edge_count(), goal_expected.len() - 1);
        }
    }

    #[test]
    fn connectors_agree_on_edges_for_fixed_pairs() {
        let graph = fixture_graph(FULL);
        for (start, goal) in fixed_pairs() {
            assert_same_edges(&graph, start, goal);
        }
    }

    #[test]
    fn connectors_agree_on_costs_for_fixed_pairs() {
        init_tracing();
        let pairs = fixed_pairs();
        assert_same_costs(&fixture_graph(FULL), false, &pairs);
        assert_same_costs(&fixture_graph(REDUCED), true, &pairs);
    }

    #[test]
    fn connectors_agree_on_random_pairs() {
        let pairs = random_pairs(300);
        assert_same_costs(&fixture_graph(FULL), false, &pairs);
        assert_same_costs(&fixture_graph(REDUCED), true, &pairs);
    }

    /// Integer rectangles in a 5 x 5 layout of 8-unit cells inside a 40 x 40
    /// boundary, so many vertices share rows, columns and diagonals.
    fn grid_rectangles(rng: &mut StdRng) -> Vec<Vec<Point2>> {
        let corner = |x: u8, y: u8| Point2::new(f32::from(x), f32::from(y));
        let mut polygons = Vec::new();
        for row in 0..5_u8 {
            for col in 0..5_u8 {
                if rng.random_bool(0.3) {
                    continue;
                }
                let (x, y) = (col * 8, row * 8);
                let x0 = x + rng.random_range(1..=3);
                let y0 = y + rng.random_range(1..=3);
                let x1 = rng.random_range(x0 + 1..=x + 7);
                let y1 = rng.random_range(y0 + 1..=y + 7);
                polygons.push(vec![
                    corner(x0, y0),
                    corner(x1, y0),
                    corner(x1, y1),
                    corner(x0, y1),
                ]);
            }
        }
        polygons.push(vec![corner(0, 0), corner(0, 40), corner(40, 40), corner(40, 0)]);
        polygons
    }

    /// Half-integer points outside every rectangle; they never lie on an
    /// obstacle edge but line up with many vertex pairs.
    fn grid_points(rng: &mut StdRng, rectangles: &[Vec<Point2>], count: usize) -> Vec<Point2> {
        let inside = |p: Point2| {
            rectangles[..rectangles.len() - 1].iter().any(|rect| {
                p.x > rect[0].x && p.x < rect[2].x && p.y > rect[0].y && p.y < rect[2].y
            })
        };
        let mut points = Vec::with_capacity(count);
        while points.len() < count {
            let x = f32::from(rng.random_range(0..40_u8)) + 0.5;
            let y = f32::from(rng.random_range(0..40_u8)) + 0.5;
            let p = Point2::new(x, y);
            if !inside(p) {
                points.push(p);
            }
        }
        points
    }

    #[test]
    fn connectors_agree_on_collinear_grid_layouts() {
        init_tracing();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..6 {
            let rectangles = grid_rectangles(&mut rng);
            let graph = GraphBuilder::new(FULL).build(&rectangles).unwrap();
            let points = grid_points(&mut rng, &rectangles, 300);
            let pairs: Vec<_> = points.chunks(2).map(|pair| (pair[0], pair[1])).collect();
            assert_same_costs(&graph, false, &pairs);
            // Points just off each corner line up with the rectangle diagonals.
            let corners: Vec<_> = rectangles
                .iter()
                .take(rectangles.len() - 1)
                .map(|rect| rect[0] - nalgebra::Vector2::new(0.5, 0.5))
                .collect();
            let corner_pairs: Vec<_> = corners.windows(2).map(|pair| (pair[0], pair[1])).collect();
            assert_same_costs(&graph, false, &corner_pairs);
        }
    }

    #[test]
    fn lazy_theta_star_never_worse_than_astar() {
        let pairs = random_pairs(150);
        let wedged = fixture_graph(FULL);
        let plain = fixture_graph(SweepOptions {
            reduced: false,
            store_wedges: false,
        });
        let mut sweep = PlaneSweepConnector::new(false);
        let mut plain_sweep = PlaneSweepConnector::new(false);
        let mut dfs = dfs_connector(&wedged, false);
        let runs: [(&VisibilityGraph, &mut dyn Connector); 3] = [
            (&wedged, &mut sweep),
            (&wedged, &mut dfs),
            (&plain, &mut plain_sweep),
        ];
        let mut astar = Pathfinder::new(SearchStrategy::AStar);
        let mut lazy = Pathfinder::new(SearchStrategy::LazyThetaStar);
        for (graph, connector) in runs {
            for &(start, goal) in &pairs {
                let optimal = graph.find_path(&mut *connector, &mut astar, start, goal);
                let path = graph.find_path(&mut *connector, &mut lazy, start, goal);
                assert_eq!(optimal.is_some(), path.is_some(), "{start:?} -> {goal:?}");
                if let (Some(optimal), Some(path)) = (optimal, path) {
                    let (a, b) = (path_cost(&optimal), path_cost(&path));
                    assert!(b <= a + 0.1, "{start:?} -> {goal:?}: astar {a}, lazy {b}");
                }
            }
        }
    }

    #[test]
    fn dfs_survives_epoch_wraparound() {
        let graph = fixture_graph(FULL);
        let mut connector = dfs_connector(&graph, false);
        let pairs = fixed_pairs();
        let edge_sets = |connector: &mut DfsVgConnector| -> Vec<_> {
            pairs
                .iter()
                .map(|&(start, goal)| {
                    graph.connect(&mut *connector, start, goal).map(|overlay| {
                        (
                            edge_points(&overlay, QueryEnd::Start),
                            edge_points(&overlay, QueryEnd::Goal),
                        )
                    })
                })
                .collect()
        };
        let expected = edge_sets(&mut connector);
        assert!(expected.iter().filter(|edges| edges.is_some()).count() > 5);
        connector.visited_mut().set_epoch(u32::MAX - 3);
        assert_eq!(edge_sets(&mut connector), expected);
        assert!(connector.visited_mut().epoch() < 20);
    }

    #[test]
    fn reduced_graph_keeps_shortest_paths() {
        let full = fixture_graph(FULL);
        let reduced = fixture_graph(REDUCED);
        let mut full_connector = PlaneSweepConnector::new(false);
        let mut reduced_connector = PlaneSweepConnector::new(true);
        let mut pathfinder = Pathfinder::new(SearchStrategy::AStar);
        for (start, goal) in fixed_pairs().into_iter().chain(random_pairs(50)) {
            let a = full.find_path(&mut full_connector, &mut pathfinder, start, goal);
            let b = reduced.find_path(&mut reduced_connector, &mut pathfinder, start, goal);
            assert_eq!(a.is_some(), b.is_some(), "{start:?} -> {goal:?}");
            if let (Some(a), Some(b)) = (a, b) {
                assert!((path_cost(&a) - path_cost(&b)).abs() < 0.1, "{start:?} -> {goal:?}");
            }
        }
    }

    #[test]
    fn dfs_needs_stored_wedges() {
        let graph = fixture_graph(SweepOptions {
            reduced: false,
            store_wedges: false,
        });
        assert!(matches!(
            DfsVgConnector::new(&graph, DfsConfig::default()),
            Err(VisGraphError::Connector(ConnectorError::MissingWedges))
        ));
    }

    #[test]
    fn dfs_rejects_enclosed_points() {
        let graph = fixture_graph(FULL);
        let mut connector = dfs_connector(&graph, false);
        let mut overlay =
            QueryOverlay::new(&graph, Point2::new(10.0, 10.0), Point2::new(55.0, 55.0));
        assert!(!connector.connect(&mut overlay, QueryEnd::Goal));
        assert!(overlay.edges_of(QueryEnd::Goal).is_empty());
        assert_eq!(overlay.goal_back_edge_count(), 0);
        // Session state is released after a failed connection.
        let mut overlay =
            QueryOverlay::new(&graph, Point2::new(10.0, 10.0), Point2::new(30.0, 80.0));
        assert!(connector.connect(&mut overlay, QueryEnd::Goal));
        assert!(connector.connect(&mut overlay, QueryEnd::Start));
        assert!(overlay.has_direct_edge());
    }

    #[test]
    fn dfs_line_of_sight_between_query_points() {
        let graph = fixture_graph(FULL);
        let mut connector = dfs_connector(&graph, false);
        let overlay = graph
            .connect(&mut connector, Point2::new(45.0, 55.0), Point2::new(65.0, 55.0))
            .unwrap();
        let (start, goal) = (overlay.id(QueryEnd::Start), overlay.id(QueryEnd::Goal));
        assert!(!overlay.has_direct_edge());
        assert!(!connector.line_of_sight(&overlay, start, goal));
        let corner = graph.vertices().find_vertex(Point2::new(50.0, 60.0)).unwrap();
        assert!(connector.line_of_sight(&overlay, start, corner));
        assert!(connector.line_of_sight(&overlay, corner, start));
        let hidden = graph.vertices().find_vertex(Point2::new(60.0, 50.0)).unwrap();
        assert!(!connector.line_of_sight(&overlay, start, hidden));
    }

    #[test]
    fn any_angle_search_never_beats_visibility_graph() {
        let graph = fixture_graph(FULL);
        let mut connector = dfs_connector(&graph, false);
        let mut astar = Pathfinder::new(SearchStrategy::AStar);
        for strategy in [SearchStrategy::ThetaStar, SearchStrategy::LazyThetaStar] {
            let mut any_angle = Pathfinder::new(strategy);
            for (start, goal) in fixed_pairs() {
                let optimal = graph.find_path(&mut connector, &mut astar, start, goal);
                let path = graph.find_path(&mut connector, &mut any_angle, start, goal);
                assert_eq!(optimal.is_some(), path.is_some());
                if let (Some(optimal), Some(path)) = (optimal, path) {
                    assert_eq!(path.first(), Some(&start));
                    assert_eq!(path.last(), Some(&goal));
                    assert!(path_cost(&path) >= path_cost(&optimal) - 1e-3);
                }
            }
        }
    }
}
