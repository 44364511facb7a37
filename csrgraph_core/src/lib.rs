pub mod adjacency_graph;
pub mod csr_adjacency;
pub mod csr_dump;
pub mod edge_list;
pub mod error;

pub use adjacency_graph::AdjacencyGraph;
pub use csr_adjacency::{Csr, Edge, Orientation, validate_edges};
pub use error::{CsrError, LoadError};
