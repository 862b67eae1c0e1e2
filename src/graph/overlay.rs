use std::collections::HashMap;

use super::{Edge, VisibilityGraph};
use crate::connector::Connector;
use crate::math::Point2;
use crate::search::SearchGraph;
use crate::vertices::VertexView;

/// Which injected point of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryEnd {
    Start,
    Goal,
}

impl QueryEnd {
    fn offset(self) -> usize {
        match self {
            Self::Start => 0,
            Self::Goal => 1,
        }
    }
}

/// A base graph plus one query's start and goal.
///
/// Start and goal take the ids right after the base vertex slots. Their edge
/// lists and the edges from base vertices back to the goal live here, so the
/// base graph stays untouched and dropping the overlay undoes the query.
#[derive(Debug, Clone)]
pub struct QueryOverlay<'g> {
    graph: &'g VisibilityGraph,
    points: [Point2; 2],
    start_edges: Vec<Edge>,
    goal_edges: Vec<Edge>,
    to_goal: HashMap<usize, Edge>,
}

impl<'g> QueryOverlay<'g> {
    #[must_use]
    pub fn new(graph: &'g VisibilityGraph, start: Point2, goal: Point2) -> Self {
        Self {
            graph,
            points: [start, goal],
            start_edges: Vec::new(),
            goal_edges: Vec::new(),
            to_goal: HashMap::new(),
        }
    }

    #[must_use]
    pub fn graph(&self) -> &'g VisibilityGraph {
        self.graph
    }

    /// Base vertices followed by start and goal.
    #[must_use]
    pub fn view(&self) -> VertexView<'_> {
        VertexView::new(self.graph.vertices(), &self.points)
    }

    /// Total ids addressable in the overlay.
    #[must_use]
    pub fn size(&self) -> usize {
        self.graph.len() + self.points.len()
    }

    #[must_use]
    pub fn id(&self, end: QueryEnd) -> usize {
        self.graph.len() + end.offset()
    }

    #[must_use]
    pub fn point(&self, end: QueryEnd) -> Point2 {
        self.points[end.offset()]
    }

    /// Position of any overlay id.
    #[must_use]
    pub fn point_of(&self, id: usize) -> Point2 {
        self.view().point(id)
    }

    /// True if `id` is a base graph vertex rather than start or goal.
    #[must_use]
    pub fn is_base(&self, id: usize) -> bool {
        id < self.graph.len()
    }

    #[must_use]
    pub fn edges_of(&self, end: QueryEnd) -> &[Edge] {
        match end {
            QueryEnd::Start => &self.start_edges,
            QueryEnd::Goal => &self.goal_edges,
        }
    }

    pub fn set_edges(&mut self, end: QueryEnd, edges: Vec<Edge>) {
        match end {
            QueryEnd::Start => self.start_edges = edges,
            QueryEnd::Goal => self.goal_edges = edges,
        }
    }

    /// Records the edge from base vertex `vertex` to the goal.
    pub fn add_goal_back_edge(&mut self, vertex: usize, cost: f32) {
        debug_assert!(self.is_base(vertex));
        let goal = self.id(QueryEnd::Goal);
        self.to_goal.insert(vertex, Edge::new(goal, cost));
    }

    /// Number of base vertices with an edge to the goal.
    #[must_use]
    pub fn goal_back_edge_count(&self) -> usize {
        self.to_goal.len()
    }

    /// Adds the start-goal edge in both directions.
    pub fn connect_direct(&mut self, cost: f32) {
        let (start, goal) = (self.id(QueryEnd::Start), self.id(QueryEnd::Goal));
        self.start_edges.push(Edge::new(goal, cost));
        self.goal_edges.push(Edge::new(start, cost));
    }

    /// True if the start has an edge straight to the goal.
    #[must_use]
    pub fn has_direct_edge(&self) -> bool {
        let goal = self.id(QueryEnd::Goal);
        self.start_edges.iter().any(|edge| edge.to == goal)
    }

    /// Outgoing edges of `id`, base edges first.
    pub fn neighbours(&self, id: usize) -> impl Iterator<Item = Edge> + '_ {
        let (edges, back): (&[Edge], Option<Edge>) = if id == self.id(QueryEnd::Start) {
            (self.start_edges.as_slice(), None)
        } else if id == self.id(QueryEnd::Goal) {
            (self.goal_edges.as_slice(), None)
        } else {
            (self.graph.edges(id), self.to_goal.get(&id).copied())
        };
        edges.iter().copied().chain(back)
    }
}

/// Search view of an overlay, with line of sight answered by a connector.
pub struct QueryGraph<'a, 'g, C: ?Sized> {
    overlay: &'a QueryOverlay<'g>,
    connector: &'a C,
}

impl<'a, 'g, C: Connector + ?Sized> QueryGraph<'a, 'g, C> {
    #[must_use]
    pub fn new(overlay: &'a QueryOverlay<'g>, connector: &'a C) -> Self {
        Self { overlay, connector }
    }
}

impl<C: Connector + ?Sized> SearchGraph for QueryGraph<'_, '_, C> {
    fn size(&self) -> usize {
        self.overlay.size()
    }

    fn edges(&self, from: usize) -> impl Iterator<Item = Edge> + '_ {
        self.overlay.neighbours(from)
    }

    fn cost(&self, from: usize, to: usize) -> f32 {
        self.heuristic(from, to)
    }

    fn heuristic(&self, from: usize, goal: usize) -> f32 {
        nalgebra::distance(&self.overlay.point_of(from), &self.overlay.point_of(goal))
    }

    fn line_of_sight(&self, from: usize, to: usize) -> bool {
        self.connector.line_of_sight(self.overlay, from, to)
    }
}
