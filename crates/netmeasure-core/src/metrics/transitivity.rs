//! Local and global clustering on the undirected simple view.

use crate::graph::paths::Adjacency;

/// Links among `v`'s neighbours and the number of neighbour pairs.
fn closed_and_possible(adj: &Adjacency, v: usize) -> (usize, usize) {
    let neighbours: Vec<usize> = adj.neighbours(v).collect();
    let k = neighbours.len();
    let mut closed = 0;
    for (i, &a) in neighbours.iter().enumerate() {
        for &b in &neighbours[i + 1..] {
            if adj.out[a].binary_search_by_key(&b, |&(x, _)| x).is_ok() {
                closed += 1;
            }
        }
    }
    (closed, k * k.saturating_sub(1) / 2)
}

/// Share of each vertex's neighbour pairs that are themselves linked.
///
/// `None` for vertices with fewer than two neighbours.
#[must_use]
pub fn local_transitivity(adj: &Adjacency) -> Vec<Option<f64>> {
    (0..adj.len())
        .map(|v| {
            let (closed, possible) = closed_and_possible(adj, v);
            (possible > 0).then(|| closed as f64 / possible as f64)
        })
        .collect()
}

/// Closed triplets over connected triplets (`3 × triangles / triples`).
///
/// `None` when the graph has no connected triple.
#[must_use]
pub fn global_transitivity(adj: &Adjacency) -> Option<f64> {
    let (closed, possible) = (0..adj.len())
        .map(|v| closed_and_possible(adj, v))
        .fold((0usize, 0usize), |(c, p), (vc, vp)| (c + vc, p + vp));
    (possible > 0).then(|| closed as f64 / possible as f64)
}
