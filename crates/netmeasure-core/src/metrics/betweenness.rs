//! Betweenness centrality via Brandes' algorithm.
//!
//! # Algorithm
//!
//! 1. For each source `s`, run a single-source shortest-path search
//!    (BFS when unweighted, Dijkstra when weighted) recording path counts
//!    and predecessors.
//! 2. Accumulate dependency scores in reverse settle order.
//! 3. Sum the dependency scores across all sources.
//!
//! Complexity: O(V·E) unweighted, O(V·E·log V) weighted.
//!
//! # Output
//!
//! Raw (unnormalized) scores indexed by local vertex. For undirected graphs
//! every pair is seen from both ends, so scores are halved.

use tracing::instrument;

use crate::graph::paths::Adjacency;

/// Betweenness of every vertex of the path view `adj`.
#[must_use]
#[instrument(skip(adj), fields(vertices = adj.len()))]
pub fn betweenness_centrality(adj: &Adjacency, directed: bool) -> Vec<f64> {
    let n = adj.len();
    let mut cb = vec![0.0; n];

    for s in 0..n {
        let mut run = adj.shortest_paths(s);
        let mut delta = vec![0.0; n];

        while let Some(w) = run.order.pop() {
            for &v in &run.preds[w] {
                if run.sigma[w] > 0.0 {
                    delta[v] += (run.sigma[v] / run.sigma[w]) * (1.0 + delta[w]);
                }
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    if !directed {
        for score in &mut cb {
            *score /= 2.0;
        }
    }
    cb
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
