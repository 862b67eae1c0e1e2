//! Visibility graph path planning among polygonal obstacles.
//!
//! [`GraphBuilder`] sweeps every obstacle vertex once to build a
//! [`VisibilityGraph`]. Queries attach start and goal through a
//! [`connector::Connector`] and search with a [`Pathfinder`].

pub mod collections;
pub mod connector;
pub mod error;
pub mod graph;
pub mod io;
pub mod math;
pub mod search;
pub mod spatial;
pub mod sweep;
pub mod vertices;
pub mod visibility;

#[cfg(test)]
mod test_support;

pub use error::{Result, VisGraphError};
pub use graph::{GraphBuilder, VisibilityGraph};
pub use search::{Pathfinder, SearchStrategy};
