use std::time::Instant;

use tracing::info;

use crate::csr_adjacency::{Csr, Edge, Orientation};
use crate::error::CsrError;

/// Both directions of one edge list.
/// `outgoing` answers "where can I go from n", `incoming` answers "who points at n".
#[derive(Debug, Clone)]
pub struct AdjacencyGraph {
    pub outgoing: Csr,
    pub incoming: Csr,
}

impl AdjacencyGraph {
    /// Builds the forward and reverse CSR in parallel.
    /// The two builds share only the read-only edge slice.
    pub fn new(edges: Option<&[Edge]>, node_count: i32) -> Result<Self, CsrError> {
        let start = Instant::now();
        let (outgoing, incoming) = rayon::join(
            || Csr::new(edges, node_count, Orientation::Forward),
            || Csr::new(edges, node_count, Orientation::Reverse),
        );
        let graph = AdjacencyGraph {
            outgoing: outgoing?,
            incoming: incoming?,
        };
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "adjacency graph built in {:.2?}",
            start.elapsed()
        );
        Ok(graph)
    }

    pub fn node_count(&self) -> u32 {
        self.outgoing.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.edge_count()
    }

    pub fn successors(&self, node: u32) -> &[u32] {
        self.outgoing.neighbors(node)
    }

    pub fn predecessors(&self, node: u32) -> &[u32] {
        self.incoming.neighbors(node)
    }

    pub fn out_degree(&self, node: u32) -> usize {
        self.outgoing.degree(node)
    }

    pub fn in_degree(&self, node: u32) -> usize {
        self.incoming.degree(node)
    }

    /// Picks the view matching `orientation`.
    pub fn view(&self, orientation: Orientation) -> &Csr {
        match orientation {
            Orientation::Forward => &self.outgoing,
            Orientation::Reverse => &self.incoming,
        }
    }
}
