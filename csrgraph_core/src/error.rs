use thiserror::Error;

/// Reasons an edge list cannot be turned into a [`Csr`](crate::csr_adjacency::Csr).
///
/// Every variant describes a problem with the caller's input. Nothing here is
/// transient, so retrying with the same edges gives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrError {
    /// The declared node count is negative.
    #[error("node count must be non-negative, got {node_count}")]
    InvalidNumNodes { node_count: i32 },
    /// The edge collection is absent (as opposed to empty).
    #[error("edge list is missing")]
    NilEdges,
    /// An edge has a negative endpoint.
    #[error("node ids must be non-negative: source={source_id}, target={target_id}")]
    NegativeNodeId { source_id: i32, target_id: i32 },
    /// An edge has an endpoint at or above the node count.
    #[error("edge node id out of bounds: source={source_id}, target={target_id}, max={max}")]
    NodeOutOfBounds {
        source_id: i32,
        target_id: i32,
        max: i32,
    },
    /// More edges than the `u32` column storage can address.
    #[error("too many edges for u32 offsets: {edge_count}")]
    TooManyEdges { edge_count: usize },
}

/// Errors raised while reading edge lists or CSR dumps from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A line of a text edge list is not a `source target` pair.
    #[error("malformed edge on line {line}: {content:?}")]
    Parse { line: usize, content: String },
    #[error("not a CSR dump (bad magic)")]
    BadMagic,
    #[error("unsupported CSR dump version {0}")]
    UnsupportedVersion(u32),
    #[error("unknown orientation tag {0}")]
    UnknownOrientation(u32),
    /// The dump decoded but its arrays break the CSR invariants.
    #[error("corrupt CSR dump: {reason}")]
    Corrupt { reason: String },
}

impl LoadError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        LoadError::Corrupt {
            reason: reason.into(),
        }
    }
}

/// Result type alias for loader operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
