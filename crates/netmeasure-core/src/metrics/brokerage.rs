//! Burt's structural-hole measures: constraint and effective size.
//!
//! Both read the strength view ([`Adjacency::strengths`]), so parallel ties
//! add up and self-loops are ignored.
//!
//! - `p(i, j) = a(i, j) / Σ_k a(i, k)`: share of `i`'s tie strength spent
//!   on `j`.
//! - Constraint: `Σ_j (p(i, j) + Σ_q p(i, q)·p(q, j))²` over `i`'s
//!   neighbours `j`, `q ∉ {i, j}`.
//! - Effective size: `Σ_j (1 - Σ_q p(i, q)·m(j, q))` where
//!   `m(j, q) = a(j, q) / max_k a(j, k)`.
//!
//! Isolates (and vertices whose ties all weigh 0) get `None`.

use crate::graph::paths::Adjacency;

/// Per-vertex constraint and effective size.
#[derive(Debug, Clone, PartialEq)]
pub struct Brokerage {
    pub constraint: Vec<Option<f64>>,
    pub effective_size: Vec<Option<f64>>,
}

fn total_strength(adj: &Adjacency, v: usize) -> f64 {
    adj.out[v].iter().map(|&(_, w)| w).sum()
}

fn proportion(adj: &Adjacency, totals: &[f64], i: usize, j: usize) -> f64 {
    if totals[i] > 0.0 {
        adj.weight(i, j) / totals[i]
    } else {
        0.0
    }
}

#[must_use]
pub fn brokerage(adj: &Adjacency) -> Brokerage {
    let n = adj.len();
    let totals: Vec<f64> = (0..n).map(|v| total_strength(adj, v)).collect();
    let maxima: Vec<f64> = (0..n)
        .map(|v| adj.out[v].iter().map(|&(_, w)| w).fold(0.0, f64::max))
        .collect();

    let mut constraint = Vec::with_capacity(n);
    let mut effective_size = Vec::with_capacity(n);

    for i in 0..n {
        if totals[i] <= 0.0 {
            constraint.push(None);
            effective_size.push(None);
            continue;
        }

        let mut c = 0.0;
        let mut es = 0.0;
        for &(j, _) in &adj.out[i] {
            let mut indirect = 0.0;
            let mut redundancy = 0.0;
            for &(q, _) in &adj.out[i] {
                if q == j {
                    continue;
                }
                let p_iq = proportion(adj, &totals, i, q);
                indirect += p_iq * proportion(adj, &totals, q, j);
                if maxima[j] > 0.0 {
                    redundancy += p_iq * adj.weight(j, q) / maxima[j];
                }
            }
            c += (proportion(adj, &totals, i, j) + indirect).powi(2);
            es += 1.0 - redundancy;
        }
        constraint.push(Some(c));
        effective_size.push(Some(es));
    }

    Brokerage {
        constraint,
        effective_size,
    }
}
