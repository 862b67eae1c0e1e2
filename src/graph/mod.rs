//! Static visibility graph and its per-query overlay.

mod edge;
mod overlay;

pub use edge::Edge;
pub use overlay::{QueryEnd, QueryGraph, QueryOverlay};

use tracing::debug;

use crate::connector::Connector;
use crate::error::{GeometryError, Result};
use crate::math::{Bbox, Point2};
use crate::search::Pathfinder;
use crate::sweep::{RotationalPlaneSweep, SweepOptions};
use crate::vertices::{VertexView, VisVertices};
use crate::visibility::Wedge;

/// Extent of the level the obstacles span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelBounds {
    pub mid: Point2,
    pub bbox: Bbox,
}

impl LevelBounds {
    #[must_use]
    pub fn from_bbox(bbox: Bbox) -> Self {
        Self {
            mid: bbox.mid(),
            bbox,
        }
    }

    /// Root cell size for spatial indexes over the level.
    #[must_use]
    pub fn cell_extent(&self) -> f32 {
        self.bbox.width().max(self.bbox.height())
    }
}

/// Precomputed visibility graph over a fixed obstacle set.
///
/// Indexed by vertex slot; descriptor slots carry no edges. The graph is
/// immutable once built, so one instance can serve queries from many
/// threads, each with its own connector and [`Pathfinder`].
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityGraph {
    vertices: VisVertices,
    edges: Vec<Vec<Edge>>,
    wedges: Option<Vec<Vec<Wedge>>>,
    visibility_bboxes: Vec<Bbox>,
    bounds: LevelBounds,
}

impl VisibilityGraph {
    pub(crate) fn from_parts(
        vertices: VisVertices,
        edges: Vec<Vec<Edge>>,
        wedges: Option<Vec<Vec<Wedge>>>,
        visibility_bboxes: Vec<Bbox>,
        bounds: LevelBounds,
    ) -> Self {
        Self {
            vertices,
            edges,
            wedges,
            visibility_bboxes,
            bounds,
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &VisVertices {
        &self.vertices
    }

    /// Number of vertex slots, descriptors included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn edges(&self, id: usize) -> &[Edge] {
        &self.edges[id]
    }

    #[must_use]
    pub fn edge_lists(&self) -> &[Vec<Edge>] {
        &self.edges
    }

    /// Total number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn has_wedges(&self) -> bool {
        self.wedges.is_some()
    }

    /// Wedge list of `id`, if wedges were stored.
    #[must_use]
    pub fn wedges(&self, id: usize) -> Option<&[Wedge]> {
        self.wedges.as_ref().map(|lists| lists[id].as_slice())
    }

    #[must_use]
    pub fn wedge_lists(&self) -> Option<&[Vec<Wedge>]> {
        self.wedges.as_deref()
    }

    /// Bounds of what `id` can see, when the graph was swept in this session.
    #[must_use]
    pub fn visibility_bbox(&self, id: usize) -> Option<Bbox> {
        self.visibility_bboxes
            .get(id)
            .copied()
            .filter(|bbox| !bbox.is_empty())
    }

    #[must_use]
    pub fn bounds(&self) -> LevelBounds {
        self.bounds
    }

    /// Attaches `start` and `goal` to the graph through `connector`.
    ///
    /// The goal is connected first so the start's connection can test for a
    /// direct start-goal edge. Returns `None` if either point is enclosed by
    /// an obstacle.
    pub fn connect<C: Connector + ?Sized>(
        &self,
        connector: &mut C,
        start: Point2,
        goal: Point2,
    ) -> Option<QueryOverlay<'_>> {
        let mut overlay = QueryOverlay::new(self, start, goal);
        if !connector.connect(&mut overlay, QueryEnd::Goal) {
            debug!(x = goal.x, y = goal.y, "goal could not be connected");
            return None;
        }
        if !connector.connect(&mut overlay, QueryEnd::Start) {
            debug!(x = start.x, y = start.y, "start could not be connected");
            return None;
        }
        Some(overlay)
    }

    /// Finds a path from `start` to `goal`, returned as the points visited.
    ///
    /// The base graph is never modified; query state lives in an overlay that
    /// is dropped before returning.
    pub fn find_path<C: Connector + ?Sized>(
        &self,
        connector: &mut C,
        pathfinder: &mut Pathfinder,
        start: Point2,
        goal: Point2,
    ) -> Option<Vec<Point2>> {
        let overlay = self.connect(connector, start, goal)?;
        let graph = QueryGraph::new(&overlay, &*connector);
        let ids = pathfinder.search(
            &graph,
            overlay.id(QueryEnd::Start),
            overlay.id(QueryEnd::Goal),
        )?;
        Some(ids.into_iter().map(|id| overlay.point_of(id)).collect())
    }
}

/// Sweeps every polygon vertex to build a [`VisibilityGraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    options: SweepOptions,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(options: SweepOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> SweepOptions {
        self.options
    }

    /// Builds the graph for `polygons`: outer boundaries clockwise, holes
    /// counter-clockwise.
    ///
    /// A reduced graph without wedges skips concave vertices entirely since no
    /// shortest path bends around them.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if `polygons` is empty, or a polygon is
    /// degenerate or has non-finite coordinates.
    pub fn build<P: AsRef<[Point2]>>(&self, polygons: &[P]) -> Result<VisibilityGraph> {
        if polygons.is_empty() {
            return Err(GeometryError::Empty.into());
        }
        let vertices = VisVertices::from_polygons(polygons)?;
        let view = VertexView::polygons_only(&vertices);
        let mut sweep = RotationalPlaneSweep::new(self.options);
        let SweepOptions {
            reduced,
            store_wedges,
        } = self.options;

        let n = vertices.len();
        let mut edges = vec![Vec::new(); n];
        let mut wedges = store_wedges.then(|| vec![Vec::new(); n]);
        let mut bboxes = vec![Bbox::empty(); n];
        for id in vertices.vertex_ids() {
            if reduced && !store_wedges && !vertices.is_convex_at(id) {
                continue;
            }
            let out = sweep.sweep(&view, id);
            edges[id] = out.edges;
            if let Some(lists) = wedges.as_mut() {
                lists[id] = out.wedges;
            }
            bboxes[id] = out.bbox;
        }

        let bounds = LevelBounds::from_bbox(vertices.bounds());
        let graph = VisibilityGraph::from_parts(vertices, edges, wedges, bboxes, bounds);
        debug!(
            vertices = graph.vertices().vertex_count(),
            edges = graph.edge_count(),
            wedges = graph
                .wedge_lists()
                .map_or(0, |lists| lists.iter().map(Vec::len).sum::<usize>()),
            reduced,
            "visibility graph built"
        );
        Ok(graph)
    }
}
