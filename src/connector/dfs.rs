use tracing::{debug, trace};

use super::{sees, Connector};
use crate::collections::EpochSlots;
use crate::error::{ConnectorError, Result};
use crate::graph::{Edge, QueryEnd, QueryOverlay, VisibilityGraph};
use crate::math::orientation::{collinear_d, orientation_d};
use crate::math::Point2;
use crate::spatial::{QuadTree, QuadTreeConfig};
use crate::vertices::VisVertices;

const VISITED: u32 = 0;

/// Settings for [`DfsVgConnector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DfsConfig {
    /// Connect to every visible vertex instead of convex ones only. Must be
    /// `true` when the base graph is not reduced.
    pub full_graph: bool,
    pub quadtree: QuadTreeConfig,
}

impl Default for DfsConfig {
    fn default() -> Self {
        Self {
            full_graph: true,
            quadtree: QuadTreeConfig::default(),
        }
    }
}

/// Connects query points by walking the stored wedges of visible vertices.
///
/// A quadtree yields one vertex the point can see. From there a depth-first
/// walk follows wedge neighbours, keeping those that see the point back, so
/// only the visible part of the graph is touched. Once the walk has inspected
/// as many wedges as there are vertex slots it finishes with a plain scan.
///
/// Needs a graph built with stored wedges.
#[derive(Debug, Clone)]
pub struct DfsVgConnector {
    config: DfsConfig,
    quadtree: QuadTree,
    visited: EpochSlots,
    stack: Vec<usize>,
    /// Vertices seen from the start, for the direct start-goal test.
    witnesses: Vec<usize>,
}

impl DfsVgConnector {
    /// Indexes the vertices of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::MissingWedges`] if `graph` was built without
    /// stored wedges.
    pub fn new(graph: &VisibilityGraph, config: DfsConfig) -> Result<Self> {
        if !graph.has_wedges() {
            return Err(ConnectorError::MissingWedges.into());
        }
        let bounds = graph.bounds();
        let vertices = graph.vertices();
        let mut quadtree = QuadTree::new(bounds.mid, bounds.cell_extent(), config.quadtree);
        for id in vertices.vertex_ids() {
            quadtree.insert(id, vertices.point(id));
        }
        debug!(
            vertices = quadtree.len(),
            full_graph = config.full_graph,
            "dfs connector indexed"
        );
        Ok(Self {
            config,
            quadtree,
            visited: EpochSlots::new(graph.len(), 1),
            stack: Vec::new(),
            witnesses: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> DfsConfig {
        self.config
    }

    #[cfg(test)]
    pub(crate) fn visited_mut(&mut self) -> &mut EpochSlots {
        &mut self.visited
    }

    fn visit_wedge_neighbours(
        &mut self,
        overlay: &QueryOverlay<'_>,
        vertex: usize,
        source: usize,
    ) {
        let wedges = overlay.graph().wedges(vertex).unwrap_or_default();
        // The trailing split wedge stores an index, not a vertex.
        for wedge in wedges.iter().take(wedges.len().saturating_sub(1)) {
            let id = wedge.closest();
            if self.visited.is_marked(id) {
                continue;
            }
            self.visited.mark(id, VISITED);
            if sees(overlay, id, source) {
                self.stack.push(id);
            }
        }
    }

    fn visit_remaining(&mut self, overlay: &QueryOverlay<'_>, source: usize) {
        for id in overlay.graph().vertices().vertex_ids() {
            if self.visited.is_marked(id) {
                continue;
            }
            self.visited.mark(id, VISITED);
            if sees(overlay, id, source) {
                self.stack.push(id);
            }
        }
    }

    /// Adds the start-goal edge when the goal lies between two witnesses that
    /// both see it.
    fn connect_direct(&self, overlay: &mut QueryOverlay<'_>) {
        let vertices = overlay.graph().vertices();
        let start = overlay.point(QueryEnd::Start);
        let goal = overlay.point(QueryEnd::Goal);
        let goal_id = overlay.id(QueryEnd::Goal);

        let mut cw: Option<usize> = None;
        let mut ccw: Option<usize> = None;
        for &id in &self.witnesses {
            let p = vertices.point(id);
            let o = orientation_d(start, goal, p);
            if collinear_d(o) {
                cw = Some(id);
                ccw = Some(id);
                break;
            }
            if o < 0.0 {
                if is_closer_bound(vertices, start, p, ccw, false) {
                    ccw = Some(id);
                }
            } else if is_closer_bound(vertices, start, p, cw, true) {
                cw = Some(id);
            }
        }
        let (Some(cw), Some(ccw)) = (cw, ccw) else {
            return;
        };
        if sees(overlay, cw, goal_id)
            && sees(overlay, ccw, goal_id)
            && !crosses_incident_edges(vertices, start, goal, ccw)
            && !crosses_incident_edges(vertices, start, goal, cw)
        {
            trace!(cw, ccw, "start sees goal");
            overlay.connect_direct(nalgebra::distance(&start, &goal));
        }
    }
}

impl Connector for DfsVgConnector {
    fn connect(&mut self, overlay: &mut QueryOverlay<'_>, end: QueryEnd) -> bool {
        let graph = overlay.graph();
        let vertices = graph.vertices();
        let slots = graph.len();
        let source = overlay.id(end);
        let source_point = overlay.point(end);
        let is_goal = end == QueryEnd::Goal;

        self.visited.ensure_len(slots);
        self.stack.clear();
        self.witnesses.clear();

        let seed = {
            let visited = &mut self.visited;
            let overlay = &*overlay;
            self.quadtree.find_visible_point(source_point, |found| {
                visited.mark(found, VISITED);
                sees(overlay, found, source)
            })
        };
        let Some(seed) = seed else {
            trace!(x = source_point.x, y = source_point.y, "no visible vertex");
            self.visited.advance();
            return false;
        };

        let mut edges = Vec::new();
        let mut inspected = 0;
        self.stack.push(seed);
        while let Some(vertex) = self.stack.pop() {
            if self.config.full_graph || vertices.is_convex_at(vertex) {
                let cost = nalgebra::distance(&source_point, &vertices.point(vertex));
                if is_goal {
                    overlay.add_goal_back_edge(vertex, cost);
                }
                edges.push(Edge::new(vertex, cost));
            }
            if !is_goal {
                self.witnesses.push(vertex);
            }
            if inspected < slots {
                self.visit_wedge_neighbours(overlay, vertex, source);
                inspected += graph.wedges(vertex).map_or(0, <[_]>::len);
                if inspected >= slots {
                    debug!(inspected, slots, "dense visibility, scanning remaining vertices");
                    self.visit_remaining(overlay, source);
                }
            }
        }
        trace!(?end, seed, edges = edges.len(), "connected");
        overlay.set_edges(end, edges);

        if !is_goal {
            self.connect_direct(overlay);
        }
        self.visited.advance();
        true
    }

    fn line_of_sight(&self, overlay: &QueryOverlay<'_>, from: usize, to: usize) -> bool {
        sees(overlay, from, to)
    }
}

/// True if `p` bounds the goal direction more tightly than `other`, breaking
/// collinear ties by distance.
fn is_closer_bound(
    vertices: &VisVertices,
    center: Point2,
    p: Point2,
    other: Option<usize>,
    clockwise: bool,
) -> bool {
    let Some(other) = other else {
        return true;
    };
    let other = vertices.point(other);
    let o = orientation_d(center, other, p);
    let nearer =
        nalgebra::distance_squared(&center, &p) < nalgebra::distance_squared(&center, &other);
    (collinear_d(o) && nearer) || if clockwise { o < 0.0 } else { o > 0.0 }
}

fn crosses_incident_edges(vertices: &VisVertices, a: Point2, b: Point2, id: usize) -> bool {
    vertices.line_to_edge(a, b, vertices.prev(id)).hit || vertices.line_to_edge(a, b, id).hit
}
