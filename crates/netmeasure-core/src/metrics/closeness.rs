//! Closeness and reach.
//!
//! Closeness is computed over the vertices a source can actually reach:
//! `|R| / Σ d(s, r)` for `r ∈ R`. Unreachable pairs contribute nothing
//! instead of an infinite distance, so disconnected graphs still produce
//! comparable scores. A vertex that reaches nobody has no closeness (`None`).
//!
//! Directed graphs use outgoing paths.

use tracing::instrument;

use crate::graph::paths::Adjacency;

/// Per-vertex closeness (`None` = reaches nobody) and reach count.
#[derive(Debug, Clone, PartialEq)]
pub struct Closeness {
    pub closeness: Vec<Option<f64>>,
    pub reach: Vec<u64>,
}

#[must_use]
#[instrument(skip(adj), fields(vertices = adj.len()))]
pub fn closeness_and_reach(adj: &Adjacency) -> Closeness {
    let n = adj.len();
    let mut closeness = Vec::with_capacity(n);
    let mut reach = Vec::with_capacity(n);

    for s in 0..n {
        let (count, total) = adj.shortest_paths(s).reach();
        reach.push(count as u64);
        closeness.push((count > 0).then(|| count as f64 / total));
    }

    Closeness { closeness, reach }
}
