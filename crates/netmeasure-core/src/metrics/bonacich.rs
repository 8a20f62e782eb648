//! Bonacich power centrality.
//!
//! `c = (I - βA)⁻¹ A 1`, with `A` the symmetric strength matrix and
//! `β = ratio / λmax`. The result is rescaled so that `Σ c² = n`.
//!
//! With `ratio < 1` the series converges and `I - βA` is invertible. A
//! ratio at or above 1 can make the system singular, which is reported as
//! [`MeasureError::SingularSystem`] rather than producing garbage.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use tracing::{debug, instrument};

use crate::error::MeasureError;
use crate::graph::paths::Adjacency;

const METRIC: &str = "bonacich_power";

/// Pivots smaller than this (relative to the matrix scale) count as zero.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Bonacich power scores indexed by local vertex.
///
/// # Errors
///
/// [`MeasureError::SingularSystem`] when `I - βA` cannot be inverted.
#[instrument(skip(adj), fields(vertices = adj.len()))]
pub fn bonacich_power(adj: &Adjacency, beta_ratio: f64) -> Result<Vec<f64>, MeasureError> {
    let n = adj.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut a = DMatrix::<f64>::zeros(n, n);
    for (v, list) in adj.out.iter().enumerate() {
        for &(u, w) in list {
            a[(v, u)] = w;
        }
    }

    let lambda_max = SymmetricEigen::new(a.clone())
        .eigenvalues
        .iter()
        .copied()
        .fold(0.0, f64::max);
    let beta = if lambda_max > 0.0 { beta_ratio / lambda_max } else { 0.0 };
    debug!(lambda_max, beta, "bonacich attenuation");

    let system = DMatrix::<f64>::identity(n, n) - &a * beta;
    let rhs = &a * DVector::<f64>::from_element(n, 1.0);

    let lu = system.lu();
    let scale = 1.0 + beta.abs() * lambda_max;
    let u = lu.u();
    let singular = (0..n).any(|i| u[(i, i)].abs() <= SINGULAR_EPSILON * scale);
    let solved = if singular { None } else { lu.solve(&rhs) };
    let Some(c) = solved else {
        return Err(MeasureError::SingularSystem { metric: METRIC, beta });
    };

    let sum_sq: f64 = c.iter().map(|x| x * x).sum();
    if sum_sq <= 0.0 {
        return Ok(vec![0.0; n]);
    }
    let norm = (n as f64 / sum_sq).sqrt();
    Ok(c.iter().map(|x| x * norm).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::unweighted;

    fn power(edges: &[(usize, usize)], n: usize, ratio: f64) -> Result<Vec<f64>, MeasureError> {
        bonacich_power(&Adjacency::strengths(&unweighted(n, edges, false)), ratio)
    }

    #[test]
    fn star_matches_closed_form() {
        // Center x, leaves y: x = 3 + 3βy, y = 1 + βx with β = 0.5/√3.
        let scores = power(&[(0, 1), (0, 2), (0, 3)], 4, 0.5).expect("invertible");
        let beta = 0.5 / 3f64.sqrt();
        let x = 3.0 * (1.0 + beta) / (1.0 - 3.0 * beta * beta);
        let y = 1.0 + beta * x;

        assert!((scores[0] / scores[1] - x / y).abs() < 1e-9);
        let sum_sq: f64 = scores.iter().map(|s| s * s).sum();
        assert!((sum_sq - 4.0).abs() < 1e-9);
    }

    #[test]
    fn regular_graph_scores_are_equal() {
        let scores = power(&[(0, 1), (1, 2), (2, 0)], 3, 0.5).expect("invertible");
        for s in &scores {
            assert!((s - 1.0).abs() < 1e-9, "got {s}");
        }
    }

    #[test]
    fn no_ties_scores_zero() {
        let scores = power(&[], 3, 0.5).expect("identity system");
        assert_eq!(scores, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn ratio_of_one_is_singular() {
        let err = power(&[(0, 1)], 2, 1.0).expect_err("I - A/λ is singular");
        assert!(matches!(err, MeasureError::SingularSystem { metric: "bonacich_power", .. }));
    }

    #[test]
    fn empty_graph_is_empty() {
        assert!(power(&[], 0, 0.5).expect("empty").is_empty());
    }
}
