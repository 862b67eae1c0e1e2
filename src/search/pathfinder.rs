use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use super::{SearchGraph, SearchStrategy};
use crate::collections::EpochSlots;
use crate::math::EPSILON;

const OPEN: u32 = 0;
const CLOSED: u32 = 1;

#[derive(Debug, Clone, Copy, Default)]
struct NodeInfo {
    parent: Option<usize>,
    /// Vertex whose expansion last relaxed this one.
    via: Option<usize>,
    g: f32,
    /// Cached heuristic.
    h: f32,
}

/// Heap entry; ordered so the heap pops the lowest `f`, then lowest `h`.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    h: f32,
    id: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Reusable search state.
///
/// Per-vertex records are kept between searches and invalidated by advancing
/// an epoch, so a search costs nothing proportional to the graph size unless
/// the graph has grown. Relaxing an open vertex pushes a duplicate heap entry;
/// entries whose `f` no longer matches the vertex's record are skipped.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    strategy: SearchStrategy,
    nodes: Vec<NodeInfo>,
    stamps: EpochSlots,
    open: BinaryHeap<OpenEntry>,
    expansions: usize,
}

impl Pathfinder {
    #[must_use]
    pub fn new(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            nodes: Vec::new(),
            stamps: EpochSlots::new(0, 2),
            open: BinaryHeap::new(),
            expansions: 0,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: SearchStrategy) {
        self.strategy = strategy;
    }

    /// Heap pops performed by the last search.
    #[must_use]
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Searches from `start` to `goal`, returning the vertex ids of the path.
    pub fn search<G: SearchGraph>(
        &mut self,
        graph: &G,
        start: usize,
        goal: usize,
    ) -> Option<Vec<usize>> {
        let size = graph.size();
        if self.nodes.len() < size {
            self.nodes.resize(size, NodeInfo::default());
        }
        self.stamps.ensure_len(size);
        self.open.clear();
        self.expansions = 0;

        let h = graph.heuristic(start, goal);
        self.open.push(OpenEntry { f: h, h, id: start });
        self.nodes[start] = NodeInfo {
            parent: None,
            via: None,
            g: 0.0,
            h,
        };
        self.stamps.mark(start, OPEN);

        let mut found = false;
        while let Some(current) = self.open.pop() {
            self.expansions += 1;
            self.stamps.mark(current.id, CLOSED);
            if self.strategy == SearchStrategy::LazyThetaStar {
                self.repair_parent(graph, current.id);
            }
            if current.id == goal {
                found = true;
                break;
            }
            let node = self.nodes[current.id];
            if current.f > node.g + node.h + EPSILON {
                continue;
            }
            for edge in graph.edges(current.id) {
                self.update_vertex(graph, current.id, edge.to, node.g + edge.cost, goal);
            }
        }
        self.open.clear();
        self.stamps.advance();

        debug!(
            start,
            goal,
            found,
            expansions = self.expansions,
            strategy = ?self.strategy,
            "search finished"
        );
        found.then(|| self.reconstruct(start, goal))
    }

    fn update_vertex<G: SearchGraph>(
        &mut self,
        graph: &G,
        source: usize,
        neighbor: usize,
        g: f32,
        goal: usize,
    ) {
        if self.strategy == SearchStrategy::AStar {
            self.relax(graph, source, source, neighbor, g, goal);
            return;
        }
        if self.stamps.phase(neighbor) == Some(CLOSED) {
            return;
        }
        let lazy = self.strategy == SearchStrategy::LazyThetaStar;
        match self.nodes[source].parent {
            Some(parent) if lazy || graph.line_of_sight(parent, neighbor) => {
                let g = self.nodes[parent].g + graph.cost(parent, neighbor);
                self.relax(graph, parent, source, neighbor, g, goal);
            }
            _ => self.relax(graph, source, source, neighbor, g, goal),
        }
    }

    fn relax<G: SearchGraph>(
        &mut self,
        graph: &G,
        parent: usize,
        via: usize,
        neighbor: usize,
        g: f32,
        goal: usize,
    ) {
        let h = match self.stamps.phase(neighbor) {
            None => graph.heuristic(neighbor, goal),
            Some(_) if g < self.nodes[neighbor].g => self.nodes[neighbor].h,
            Some(_) => return,
        };
        self.open.push(OpenEntry {
            f: g + h,
            h,
            id: neighbor,
        });
        self.nodes[neighbor] = NodeInfo {
            parent: Some(parent),
            via: Some(via),
            g,
            h,
        };
        self.stamps.mark(neighbor, OPEN);
    }

    /// Lazy Theta*: re-parents `id` onto its best closed neighbour when the
    /// assumed parent is not actually visible. The vertex that relaxed `id`
    /// always competes, so a repair is never worse than the plain A* parent.
    fn repair_parent<G: SearchGraph>(&mut self, graph: &G, id: usize) {
        let Some(parent) = self.nodes[id].parent else {
            return;
        };
        if graph.line_of_sight(parent, id) {
            return;
        }
        let closed = graph
            .edges(id)
            .filter(|edge| self.stamps.phase(edge.to) == Some(CLOSED))
            .map(|edge| (edge.to, self.nodes[edge.to].g + edge.cost));
        // The expansion that relaxed `id` competes even when the graph holds
        // no edge back to it.
        let via = self.nodes[id]
            .via
            .map(|via| (via, self.nodes[via].g + graph.cost(via, id)));
        let Some((parent, g)) = closed.chain(via).min_by(|a, b| a.1.total_cmp(&b.1)) else {
            return;
        };
        let node = &mut self.nodes[id];
        node.parent = Some(parent);
        node.g = g;
    }

    fn reconstruct(&self, start: usize, goal: usize) -> Vec<usize> {
        let mut path = vec![goal];
        let mut current = goal;
        while current != start {
            let Some(parent) = self.nodes[current].parent else {
                break;
            };
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    #[cfg(test)]
    pub(crate) fn stamps_mut(&mut self) -> &mut EpochSlots {
        &mut self.stamps
    }
}
