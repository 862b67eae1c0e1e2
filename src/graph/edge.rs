/// Directed adjacency entry: neighbour id and Euclidean length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub cost: f32,
}

impl Edge {
    #[must_use]
    pub fn new(to: usize, cost: f32) -> Self {
        Self { to, cost }
    }
}
