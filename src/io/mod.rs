//! Persistence formats: the binary `.vg` graph file and the union polygon text file.

pub mod graph_format;
pub mod union_format;

pub use graph_format::{load_graph, read_graph, save_graph, write_graph};
pub use union_format::UnionPolygon;
