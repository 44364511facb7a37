use tracing::{debug, trace};

use crate::error::CsrError;

/// A directed edge between two node ids.
///
/// Ids are signed so that bad input coming from a loader can be represented
/// and rejected by [`validate_edges`] instead of silently wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: i32,
    pub target: i32,
}

impl Edge {
    pub fn new(source: i32, target: i32) -> Self {
        Self { source, target }
    }
}

impl From<(i32, i32)> for Edge {
    fn from((source, target): (i32, i32)) -> Self {
        Self { source, target }
    }
}

/// Which endpoint of an edge a node's adjacency run is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Runs hold outgoing neighbors: node `n` lists the targets of edges `n -> t`.
    #[default]
    Forward,
    /// Runs hold incoming neighbors: node `n` lists the sources of edges `s -> n`.
    Reverse,
}

impl Orientation {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Orientation::Reverse
        } else {
            Orientation::Forward
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Orientation::Reverse
    }

    /// Splits an edge into (grouping row, stored value).
    /// Only call on edges that passed validation.
    #[inline(always)]
    fn split(self, edge: &Edge) -> (usize, u32) {
        match self {
            Orientation::Forward => (edge.source as usize, edge.target as u32),
            Orientation::Reverse => (edge.target as usize, edge.source as u32),
        }
    }
}

/// Checks an edge list against a node count before anything is allocated.
///
/// Scans left to right and reports the first bad edge. A negative endpoint
/// wins over an out-of-bounds one on the same edge.
pub fn validate_edges(edges: Option<&[Edge]>, node_count: i32) -> Result<(), CsrError> {
    checked_edges(edges, node_count).map(|_| ())
}

fn checked_edges(edges: Option<&[Edge]>, node_count: i32) -> Result<&[Edge], CsrError> {
    let edges = edges.ok_or(CsrError::NilEdges)?;

    for &Edge { source, target } in edges {
        if source < 0 || target < 0 {
            return Err(CsrError::NegativeNodeId {
                source_id: source,
                target_id: target,
            });
        }
        if source >= node_count || target >= node_count {
            return Err(CsrError::NodeOutOfBounds {
                source_id: source,
                target_id: target,
                max: node_count.saturating_sub(1),
            });
        }
    }
    Ok(edges)
}

/// An immutable Compressed Sparse Row adjacency list.
/// Replaces Vec<Vec<u32>>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csr {
    // Start index in `column_indices` for each node.
    // Length = node_count + 1
    row_offsets: Vec<u32>,

    // All adjacency runs back to back.
    column_indices: Vec<u32>,

    node_count: u32,
    orientation: Orientation,
}

impl Csr {
    /// Builds a CSR from unsorted edges with a counting sort (count, prefix sum, place).
    ///
    /// - `edges`: `None` is an error distinct from an empty slice.
    /// - `node_count`: number of nodes; every endpoint must be below it.
    /// - `orientation`: group edges by source ([`Orientation::Forward`]) or
    ///   by target ([`Orientation::Reverse`]).
    ///
    /// Within a run, neighbors keep the relative order of the input edges.
    pub fn new(
        edges: Option<&[Edge]>,
        node_count: i32,
        orientation: Orientation,
    ) -> Result<Self, CsrError> {
        let num_nodes =
            usize::try_from(node_count).map_err(|_| CsrError::InvalidNumNodes { node_count })?;
        let edges = checked_edges(edges, node_count)?;
        let edge_count = edges.len();
        if u32::try_from(edge_count).is_err() {
            return Err(CsrError::TooManyEdges { edge_count });
        }

        // 1. Count degrees, shifted by one so the prefix sum lands in place.
        let mut row_offsets = vec![0u32; num_nodes + 1];
        for edge in edges {
            let (row, _) = orientation.split(edge);
            row_offsets[row + 1] += 1;
        }
        trace!(nodes = num_nodes, "counted degrees");

        // 2. Counts -> offsets
        for i in 0..num_nodes {
            row_offsets[i + 1] += row_offsets[i];
        }

        // 3. Place values, using a copy of the offsets as write cursors.
        let mut column_indices = vec![0u32; edge_count];
        let mut cursors = row_offsets[..num_nodes].to_vec();
        for edge in edges {
            let (row, value) = orientation.split(edge);
            let cursor = &mut cursors[row];
            column_indices[*cursor as usize] = value;
            *cursor += 1;
        }

        debug!(
            nodes = num_nodes,
            edges = edge_count,
            ?orientation,
            "built CSR"
        );

        Ok(Csr {
            row_offsets,
            column_indices,
            node_count: node_count as u32,
            orientation,
        })
    }

    /// Reassembles a CSR from raw arrays, checking every structural invariant.
    /// Used by the dump reader, which cannot trust its input.
    pub(crate) fn from_parts(
        row_offsets: Vec<u32>,
        column_indices: Vec<u32>,
        orientation: Orientation,
    ) -> Result<Self, String> {
        let Some(&last) = row_offsets.last() else {
            return Err("row offsets are empty".to_string());
        };
        let node_count = row_offsets.len() - 1;
        if i32::try_from(node_count).is_err() {
            return Err(format!("node count {node_count} exceeds i32::MAX"));
        }
        if row_offsets[0] != 0 {
            return Err(format!("first row offset is {}, expected 0", row_offsets[0]));
        }
        if last as usize != column_indices.len() {
            return Err(format!(
                "last row offset is {last}, expected edge count {}",
                column_indices.len()
            ));
        }
        if let Some(row) = row_offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(format!("row offsets decrease at node {row}"));
        }
        if let Some(&value) = column_indices.iter().find(|&&v| v as usize >= node_count) {
            return Err(format!(
                "column index {value} out of range for {node_count} nodes"
            ));
        }

        Ok(Csr {
            row_offsets,
            column_indices,
            node_count: node_count as u32,
            orientation,
        })
    }

    /// Returns the adjacency run of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node >= node_count`. Use [`Csr::get`] for untrusted ids.
    #[inline(always)]
    pub fn neighbors(&self, node: u32) -> &[u32] {
        assert!(
            node < self.node_count,
            "node {node} out of range for CSR with {} nodes",
            self.node_count
        );
        self.run(node as usize)
    }

    /// Returns the adjacency run of `node`, or `None` if the id is out of range.
    #[inline(always)]
    pub fn get(&self, node: u32) -> Option<&[u32]> {
        (node < self.node_count).then(|| self.run(node as usize))
    }

    /// Number of neighbors of `node` in this orientation.
    ///
    /// # Panics
    ///
    /// Panics if `node >= node_count`.
    pub fn degree(&self, node: u32) -> usize {
        self.neighbors(node).len()
    }

    pub fn max_degree(&self) -> usize {
        self.row_offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .max()
            .unwrap_or(0)
    }

    /// Iterates `(row, value)` pairs in storage order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.node_count)
            .flat_map(move |row| self.run(row as usize).iter().map(move |&value| (row, value)))
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.column_indices.len()
    }

    /// True when the CSR holds no edges (it may still have nodes).
    pub fn is_empty(&self) -> bool {
        self.column_indices.is_empty()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn row_offsets(&self) -> &[u32] {
        &self.row_offsets
    }

    pub fn column_indices(&self) -> &[u32] {
        &self.column_indices
    }

    #[inline(always)]
    fn run(&self, node: usize) -> &[u32] {
        let start = self.row_offsets[node] as usize;
        let end = self.row_offsets[node + 1] as usize;
        &self.column_indices[start..end]
    }
}
