//! Degree and strength.
//!
//! Counts every stored tie, so parallel ties count once each and a self-loop
//! contributes 2 to the total (once as outgoing, once as incoming). For
//! undirected graphs only the total is meaningful.

use crate::graph::NetworkGraph;

/// Per-vertex degree and strength, indexed by local vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Degrees {
    pub in_degree: Vec<u64>,
    pub out_degree: Vec<u64>,
    pub total_degree: Vec<u64>,
    pub in_strength: Vec<f64>,
    pub out_strength: Vec<f64>,
    pub total_strength: Vec<f64>,
}

/// Compute degrees and strengths for every vertex of `g`.
#[must_use]
pub fn degrees(g: &NetworkGraph) -> Degrees {
    let n = g.vertex_count();
    let mut in_degree = vec![0u64; n];
    let mut out_degree = vec![0u64; n];
    let mut in_strength = vec![0.0; n];
    let mut out_strength = vec![0.0; n];

    for (s, t, tie) in g.ties() {
        out_degree[s] += 1;
        in_degree[t] += 1;
        out_strength[s] += tie.weight;
        in_strength[t] += tie.weight;
    }

    let total_degree = in_degree.iter().zip(&out_degree).map(|(a, b)| a + b).collect();
    let total_strength = in_strength.iter().zip(&out_strength).map(|(a, b)| a + b).collect();

    Degrees {
        in_degree,
        out_degree,
        total_degree,
        in_strength,
        out_strength,
        total_strength,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::graph;

    #[test]
    fn chain_degrees() {
        // 0 -> 1 -> 2
        let d = degrees(&graph(3, &[(0, 1, 1.0), (1, 2, 1.0)], true));
        assert_eq!(d.in_degree, vec![0, 1, 1]);
        assert_eq!(d.out_degree, vec![1, 1, 0]);
        assert_eq!(d.total_degree, vec![1, 2, 1]);
    }

    #[test]
    fn self_loop_counts_twice() {
        let d = degrees(&graph(2, &[(0, 0, 1.0), (0, 1, 1.0)], false));
        assert_eq!(d.total_degree, vec![3, 1]);
    }

    #[test]
    fn parallel_ties_each_count() {
        let d = degrees(&graph(2, &[(0, 1, 2.0), (1, 0, 0.5)], false));
        assert_eq!(d.total_degree, vec![2, 2]);
        assert!((d.total_strength[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn isolate_has_zero_degree() {
        let d = degrees(&graph(3, &[(0, 1, 1.0)], false));
        assert_eq!(d.total_degree[2], 0);
        assert!(d.total_strength[2].abs() < f64::EPSILON);
    }
}
