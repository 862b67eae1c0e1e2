//! Spatial indexing used to seed connector searches.

pub mod quadtree;

pub use quadtree::{QuadTree, QuadTreeConfig};
