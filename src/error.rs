use thiserror::Error;

/// Top-level error type for visibility graph construction and persistence.
#[derive(Debug, Error)]
pub enum VisGraphError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the obstacle polygons handed to the graph builder.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("polygon {index} has {len} vertices, at least 3 are required")]
    DegeneratePolygon { index: usize, len: usize },

    #[error("polygon {polygon} vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate { polygon: usize, vertex: usize },

    #[error("no obstacle polygons given")]
    Empty,
}

/// Errors raised while decoding a persisted graph or a union polygon file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("negative {what} count {value}")]
    NegativeCount { what: &'static str, value: i32 },

    #[error("{what} count {found} does not match vertex count {expected}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("vertex {vertex} references neighbour {neighbour} outside 0..{len}")]
    NeighbourOutOfRange {
        vertex: usize,
        neighbour: i32,
        len: usize,
    },

    #[error("descriptor at slot {slot} points at {opposite}, outside 0..{len}")]
    DanglingDescriptor { slot: usize, opposite: u32, len: usize },

    #[error("slot {slot} breaks the polygon layout")]
    BrokenLayout { slot: usize },

    #[error("vertex {vertex} references descriptor slot {neighbour}")]
    DescriptorNeighbour { vertex: usize, neighbour: usize },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: expected ':' in hole declaration")]
    MissingHoleSeparator { line: usize },

    #[error("line {line}: contour {index} does not exist")]
    UnknownContour { line: usize, index: usize },
}

/// Errors related to setting up a connector.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("graph was built without visibility wedges")]
    MissingWedges,
}

/// Convenience type alias for results using [`VisGraphError`].
pub type Result<T> = std::result::Result<T, VisGraphError>;
