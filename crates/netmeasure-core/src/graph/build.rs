//! Graph construction from reconciled edge rows.
//!
//! # Overview
//!
//! [`NetworkGraph`] is a thin wrapper over a petgraph [`DiGraph`] whose node
//! weights are vertex-universe indices and whose edge weights are [`Tie`]s.
//! Directedness is a runtime flag: an undirected graph stores each tie once,
//! in the orientation it was supplied, and algorithms read both directions.
//!
//! ## What is preserved
//!
//! Self-loops and parallel ties are kept verbatim. Deduplication is the
//! caller's job before ingestion. Isolates are ordinary zero-degree nodes.
//!
//! ## Ownership
//!
//! Induced subgraphs ([`NetworkGraph::induced_subgraph`]) are owned copies
//! that keep the parent's universe indices as node weights, so they outlive
//! the graph they were cut from.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::instrument;

use crate::layers::EdgeRow;

// ---------------------------------------------------------------------------
// Tie
// ---------------------------------------------------------------------------

/// Edge payload: the edge-list row it came from and its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tie {
    pub dyad: usize,
    pub weight: f64,
}

// ---------------------------------------------------------------------------
// NetworkGraph
// ---------------------------------------------------------------------------

/// A directed-or-undirected weighted multigraph over (part of) the universe.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    /// Node weight = universe index; edge weight = [`Tie`].
    pub graph: DiGraph<usize, Tie>,
    directed: bool,
}

impl NetworkGraph {
    /// Build a graph over `vertex_count` vertices from edge rows.
    ///
    /// Rows are added in slice order; `ego`/`alter` must be below
    /// `vertex_count`.
    #[must_use]
    #[instrument(skip(edges), fields(edges = edges.len()))]
    pub fn from_edgelist(vertex_count: usize, edges: &[EdgeRow], directed: bool) -> Self {
        let mut graph = DiGraph::with_capacity(vertex_count, edges.len());
        for v in 0..vertex_count {
            graph.add_node(v);
        }
        for row in edges {
            graph.add_edge(
                NodeIndex::new(row.ego),
                NodeIndex::new(row.alter),
                Tie {
                    dyad: row.dyad_id,
                    weight: row.weight,
                },
            );
        }
        Self { graph, directed }
    }

    #[must_use]
    pub const fn directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `true` when some tie weight differs from 1.
    #[must_use]
    pub fn weighted(&self) -> bool {
        self.graph
            .raw_edges()
            .iter()
            .any(|e| (e.weight.weight - 1.0).abs() > f64::EPSILON)
    }

    /// Universe index of local vertex `v`.
    ///
    /// Identity for full graphs; the parent's index for subgraphs.
    #[must_use]
    pub fn universe_index(&self, v: usize) -> usize {
        self.graph.node_weight(NodeIndex::new(v)).copied().unwrap_or(v)
    }

    /// Universe indices of every local vertex, in local order.
    #[must_use]
    pub fn universe_indices(&self) -> Vec<usize> {
        self.graph.raw_nodes().iter().map(|n| n.weight).collect()
    }

    /// Every tie as `(source, target, tie)` in local indices, insertion order.
    pub fn ties(&self) -> impl Iterator<Item = (usize, usize, &Tie)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }

    /// Owned copy restricted to `vertices` (local indices, any order).
    ///
    /// Keeps every tie whose endpoints are both kept, multi-edges and
    /// self-loops included. Local order in the result follows `vertices`.
    #[must_use]
    pub fn induced_subgraph(&self, vertices: &[usize]) -> Self {
        let mut local = vec![None; self.vertex_count()];
        let mut graph = DiGraph::with_capacity(vertices.len(), 0);
        for &v in vertices {
            if local[v].is_none() {
                local[v] = Some(graph.add_node(self.universe_index(v)));
            }
        }
        for (s, t, tie) in self.ties() {
            if let (Some(a), Some(b)) = (local[s], local[t]) {
                graph.add_edge(a, b, *tie);
            }
        }
        Self {
            graph,
            directed: self.directed,
        }
    }
}

impl Serialize for NetworkGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct TieRow {
            source: usize,
            target: usize,
            dyad: usize,
            weight: f64,
        }

        let ties: Vec<TieRow> = self
            .ties()
            .map(|(s, t, tie)| TieRow {
                source: self.universe_index(s),
                target: self.universe_index(t),
                dyad: tie.dyad,
                weight: tie.weight,
            })
            .collect();

        let mut state = serializer.serialize_struct("NetworkGraph", 3)?;
        state.serialize_field("directed", &self.directed)?;
        state.serialize_field("vertices", &self.universe_indices())?;
        state.serialize_field("ties", &ties)?;
        state.end()
    }
}

/// BLAKE3 hash of an edge list, used to detect changed inputs.
#[must_use]
pub fn edgelist_hash(edges: &[EdgeRow]) -> String {
    let mut hasher = blake3::Hasher::new();
    for row in edges {
        hasher.update(&(row.ego as u64).to_le_bytes());
        hasher.update(&(row.alter as u64).to_le_bytes());
        hasher.update(&row.weight.to_bits().to_le_bytes());
        hasher.update(row.layer.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
