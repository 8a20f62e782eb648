//! Eigenvector centrality via power iteration.
//!
//! # Overview
//!
//! Eigenvector centrality scores vertices by the scores of their neighbours:
//! the dominant eigenvector of the (symmetric) strength matrix `A`.
//!
//! # Algorithm
//!
//! Power iteration on `A + I`:
//!
//! 1. Start from the all-ones vector.
//! 2. `x ← (A + I)·x`, then scale so the largest entry is 1.
//! 3. Stop when the L2 change between steps drops below `tolerance`, or
//!    after `max_iter` steps.
//!
//! The identity shift keeps every eigenvalue of `A + I` apart from the
//! negative end of `A`'s spectrum, so bipartite graphs (star, path) converge
//! instead of oscillating. The eigenvectors are those of `A`.
//!
//! Directed graphs are read through [`Adjacency::strengths`], which is the
//! symmetrized copy the caller reports in an advisory.
//!
//! # Output
//!
//! Scores indexed by local vertex, largest = 1. A graph without non-loop
//! ties scores 0 everywhere.

use tracing::{debug, instrument};

use crate::graph::paths::Adjacency;

/// Result of eigenvector centrality computation.
#[derive(Debug, Clone)]
pub struct EigenvectorResult {
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

/// Compute eigenvector centrality over the strength view `adj`.
#[must_use]
#[instrument(skip(adj), fields(vertices = adj.len()))]
pub fn eigenvector_centrality(adj: &Adjacency, max_iter: usize, tolerance: f64) -> EigenvectorResult {
    let n = adj.len();
    if adj.out.iter().all(Vec::is_empty) {
        return EigenvectorResult {
            scores: vec![0.0; n],
            iterations: 0,
            converged: true,
        };
    }

    let mut scores = vec![1.0; n];
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..max_iter {
        iterations = iter + 1;

        let mut next: Vec<f64> = scores.clone();
        for (v, list) in adj.out.iter().enumerate() {
            for &(u, w) in list {
                next[v] += w * scores[u];
            }
        }

        let max = next.iter().copied().fold(0.0, f64::max);
        if max > 0.0 {
            for x in &mut next {
                *x /= max;
            }
        }

        let diff: f64 = scores
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();

        scores = next;

        if diff < tolerance {
            converged = true;
            break;
        }
    }

    debug!(iterations, converged, "eigenvector power iteration finished");
    EigenvectorResult {
        scores,
        iterations,
        converged,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{graph, unweighted};

    fn eigen(g: &crate::graph::NetworkGraph) -> EigenvectorResult {
        eigenvector_centrality(&Adjacency::strengths(g), 1000, 1e-12)
    }

    #[test]
    fn empty_graph_returns_empty() {
        let r = eigen(&unweighted(0, &[], false));
        assert!(r.scores.is_empty());
        assert!(r.converged);
    }

    #[test]
    fn no_ties_scores_zero() {
        let r = eigen(&unweighted(3, &[(1, 1)], false));
        assert_eq!(r.scores, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn simple_pair_equal_scores() {
        let r = eigen(&unweighted(2, &[(0, 1)], false));
        assert!(r.converged);
        assert!((r.scores[0] - 1.0).abs() < 1e-9);
        assert!((r.scores[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn star_center_highest_eigenvector() {
        // Dominant eigenvector of a 3-leaf star: center 1, leaves 1/sqrt(3).
        let r = eigen(&unweighted(4, &[(0, 1), (0, 2), (0, 3)], false));
        assert!(r.converged);
        assert!((r.scores[0] - 1.0).abs() < 1e-9);
        for leaf in 1..4 {
            assert!((r.scores[leaf] - 1.0 / 3f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn direction_is_ignored() {
        let directed = eigen(&unweighted(3, &[(0, 1), (2, 1)], true));
        let undirected = eigen(&unweighted(3, &[(0, 1), (1, 2)], false));
        for (a, b) in directed.scores.iter().zip(&undirected.scores) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn heavier_tie_pulls_score() {
        // 1 - 0 - 2 with the 0-2 tie three times as strong.
        let r = eigen(&graph(3, &[(0, 1, 1.0), (0, 2, 3.0)], false));
        assert!(r.scores[2] > r.scores[1]);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let r = eigenvector_centrality(
            &Adjacency::strengths(&unweighted(4, &[(0, 1), (1, 2), (2, 3)], false)),
            2,
            1e-15,
        );
        assert!(!r.converged);
        assert_eq!(r.iterations, 2);
    }
}
