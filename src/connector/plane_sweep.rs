use super::{sees, Connector};
use crate::graph::{QueryEnd, QueryOverlay};
use crate::sweep::{RotationalPlaneSweep, SweepOptions};

/// Connects query points by sweeping from them.
///
/// Exact for any input and independent of stored wedges, at the price of a
/// full sweep per point.
#[derive(Debug, Default)]
pub struct PlaneSweepConnector {
    sweep: RotationalPlaneSweep,
}

impl PlaneSweepConnector {
    /// `reduced` must match how the base graph was built.
    #[must_use]
    pub fn new(reduced: bool) -> Self {
        Self {
            sweep: RotationalPlaneSweep::new(SweepOptions {
                reduced,
                store_wedges: false,
            }),
        }
    }
}

impl Connector for PlaneSweepConnector {
    fn connect(&mut self, overlay: &mut QueryOverlay<'_>, end: QueryEnd) -> bool {
        let source = overlay.id(end);
        let out = self.sweep.sweep(&overlay.view(), source);
        if end == QueryEnd::Goal {
            // The start's own sweep adds the start-goal edge.
            for edge in &out.edges {
                if overlay.is_base(edge.to) {
                    overlay.add_goal_back_edge(edge.to, edge.cost);
                }
            }
        }
        let connected = !out.edges.is_empty();
        overlay.set_edges(end, out.edges);
        connected
    }

    /// Answered from stored wedges when the graph has them. Otherwise an edge
    /// between the two ids stands in for visibility, which never reports a
    /// blocked pair as visible.
    fn line_of_sight(&self, overlay: &QueryOverlay<'_>, from: usize, to: usize) -> bool {
        if overlay.graph().has_wedges() {
            return sees(overlay, from, to);
        }
        let linked = |a: usize, b: usize| overlay.neighbours(a).any(|edge| edge.to == b);
        linked(from, to) || linked(to, from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::test_support::fixture_graph;

    #[test]
    fn goal_sweep_adds_back_edges_for_base_vertices() {
        let graph = fixture_graph(SweepOptions {
            reduced: false,
            store_wedges: false,
        });
        let mut overlay =
            QueryOverlay::new(&graph, Point2::new(30.0, 28.0), Point2::new(70.0, 26.0));
        let mut connector = PlaneSweepConnector::new(false);
        assert!(connector.connect(&mut overlay, QueryEnd::Goal));
        let goal_edges = overlay.edges_of(QueryEnd::Goal);
        let start = overlay.id(QueryEnd::Start);
        assert!(goal_edges.iter().any(|edge| edge.to == start));
        assert_eq!(overlay.goal_back_edge_count(), goal_edges.len() - 1);
        // The start has no edges until its own sweep runs.
        assert!(!connector.line_of_sight(&overlay, 2, start));
        let goal = overlay.id(QueryEnd::Goal);
        let seen = goal_edges.iter().find(|edge| overlay.is_base(edge.to)).unwrap().to;
        assert!(connector.line_of_sight(&overlay, seen, goal));
        assert!(connector.line_of_sight(&overlay, goal, seen));
    }

    #[test]
    fn line_of_sight_uses_wedges_when_stored() {
        let graph = fixture_graph(SweepOptions::default());
        let mut connector = PlaneSweepConnector::new(false);
        let overlay = graph
            .connect(&mut connector, Point2::new(45.0, 55.0), Point2::new(65.0, 55.0))
            .unwrap();
        let (start, goal) = (overlay.id(QueryEnd::Start), overlay.id(QueryEnd::Goal));
        assert!(!connector.line_of_sight(&overlay, start, goal));
        let corner = graph.vertices().find_vertex(Point2::new(50.0, 60.0)).unwrap();
        assert!(connector.line_of_sight(&overlay, start, corner));
        assert!(connector.line_of_sight(&overlay, corner, start));
        let hidden = graph.vertices().find_vertex(Point2::new(60.0, 50.0)).unwrap();
        assert!(!connector.line_of_sight(&overlay, start, hidden));
    }
}
