//! Best-first search over any graph exposing the [`SearchGraph`] contract.
//!
//! One driver serves three strategies: plain A*, Theta* (parent shortcuts
//! checked while relaxing) and Lazy Theta* (parent shortcuts assumed while
//! relaxing, verified once on expansion).

mod pathfinder;

pub use pathfinder::Pathfinder;

use crate::graph::Edge;

/// Graph contract consumed by [`Pathfinder`].
pub trait SearchGraph {
    /// Number of addressable vertex ids; every id passed in is below it.
    fn size(&self) -> usize;

    /// Outgoing edges of `from`.
    fn edges(&self, from: usize) -> impl Iterator<Item = Edge> + '_;

    /// Exact cost of moving straight from `from` to `to`.
    fn cost(&self, from: usize, to: usize) -> f32;

    /// Admissible estimate of the cost from `from` to `goal`.
    fn heuristic(&self, from: usize, goal: usize) -> f32;

    /// Whether a straight move from `from` to `to` is unobstructed.
    fn line_of_sight(&self, from: usize, to: usize) -> bool;
}

/// Relax/expand behaviour of the search loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Paths follow graph edges.
    #[default]
    AStar,
    /// Any-angle: neighbours may attach to the expanded vertex's parent.
    ThetaStar,
    /// Theta* with line-of-sight checks deferred to expansion.
    LazyThetaStar,
}
