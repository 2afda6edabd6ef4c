use thiserror::Error;

/// Common errors thrown by graph construction and partitioning routines.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A vertex declared more neighbors than the arrays handed to the builder hold.
    #[error("vertex {vertex} declares degree {degree} but got {neighbors} neighbors and {weights} edge weights")]
    DegreeMismatch {
        vertex: usize,
        degree: usize,
        neighbors: usize,
        weights: usize,
    },

    /// The builder did not receive exactly the announced number of vertices.
    #[error("expected {expected} vertices, got {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },

    /// A vertex index does not name a vertex of the graph.
    #[error("vertex {index} out of range (graph has {len} vertices)")]
    VertexOutOfRange { index: usize, len: usize },

    /// A partition id is not below the number of parts.
    #[error("partition {part} out of range (expected less than {num_parts})")]
    PartitionOutOfRange { part: usize, num_parts: usize },

    /// A move was requested towards the partition the vertex already lives in.
    #[error("vertex {vertex} already belongs to partition {part}")]
    SamePartition { vertex: usize, part: usize },

    /// Input sets don't have matching lengths.
    #[error("input sets don't have the same length (expected {expected} items, got {actual})")]
    InputLenMismatch { expected: usize, actual: usize },

    /// A coarse vertex is reached by no fine vertex or by more than two.
    #[error("coarse vertex {coarse} has {members} fine vertices (expected 1 or 2)")]
    AggregationMismatch { coarse: usize, members: usize },

    /// When a two-way component is given a partitioning with a different number of parts.
    #[error("expected exactly two parts, got {0}")]
    BiPartitioningOnly(usize),

    /// Input contains negative values and such values are not supported.
    #[error("input contains negative values")]
    NegativeValues,

    /// Configuration that cannot describe a partition.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
