//! Shortest-path primitives shared by path-based measures.
//!
//! Paths run over a simple view of the graph: parallel ties collapse to
//! their minimum weight and self-loops are dropped. Weights are distances.
//! Neighbours are visited in ascending vertex index so traversal order, and
//! therefore every tie-break, is deterministic.
//!
//! [`Adjacency::strengths`] is the other view: undirected, weights summed,
//! for spectral and brokerage measures.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use super::build::NetworkGraph;

/// Relative tolerance for treating two path lengths as equal.
const PATH_EPSILON: f64 = 1e-12;

fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= PATH_EPSILON * a.abs().max(b.abs()).max(1.0)
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Simple weighted adjacency lists: `out[v]` = `(neighbour, distance)`.
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub out: Vec<Vec<(usize, f64)>>,
    pub weighted: bool,
}

impl Adjacency {
    /// Path view of `g`, honouring its directedness.
    #[must_use]
    pub fn for_paths(g: &NetworkGraph) -> Self {
        Self::build(g, !g.directed())
    }

    /// Path view with direction ignored.
    #[must_use]
    pub fn undirected(g: &NetworkGraph) -> Self {
        Self::build(g, true)
    }

    /// Undirected view with weights read as tie strength: parallel ties and
    /// both directions of a directed pair are summed, self-loops dropped.
    #[must_use]
    pub fn strengths(g: &NetworkGraph) -> Self {
        let n = g.vertex_count();
        let mut out: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (s, t, tie) in g.ties() {
            if s != t {
                out[s].push((t, tie.weight));
                out[t].push((s, tie.weight));
            }
        }
        for list in &mut out {
            list.sort_by_key(|&(v, _)| v);
            let mut merged: Vec<(usize, f64)> = Vec::with_capacity(list.len());
            for &(v, w) in list.iter() {
                match merged.last_mut() {
                    Some(last) if last.0 == v => last.1 += w,
                    _ => merged.push((v, w)),
                }
            }
            *list = merged;
        }
        Self {
            out,
            weighted: g.weighted(),
        }
    }

    /// Strength of the tie between `v` and `w`, 0 when absent.
    #[must_use]
    pub fn weight(&self, v: usize, w: usize) -> f64 {
        self.out[v]
            .binary_search_by_key(&w, |&(x, _)| x)
            .map_or(0.0, |pos| self.out[v][pos].1)
    }

    fn build(g: &NetworkGraph, both_ways: bool) -> Self {
        let n = g.vertex_count();
        let mut out: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (s, t, tie) in g.ties() {
            if s == t {
                continue;
            }
            out[s].push((t, tie.weight));
            if both_ways {
                out[t].push((s, tie.weight));
            }
        }
        for list in &mut out {
            list.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            list.dedup_by_key(|(v, _)| *v);
        }
        Self {
            out,
            weighted: g.weighted(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Neighbour indices of `v` without weights.
    pub fn neighbours(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.out[v].iter().map(|&(w, _)| w)
    }

    /// Single-source shortest paths from `s`.
    #[must_use]
    pub fn shortest_paths(&self, s: usize) -> PathRun {
        if self.weighted {
            self.dijkstra(s)
        } else {
            self.bfs(s)
        }
    }

    fn bfs(&self, s: usize) -> PathRun {
        let mut run = PathRun::start(self.len(), s);
        let mut queue = VecDeque::from([s]);

        while let Some(v) = queue.pop_front() {
            run.order.push(v);
            let dv = run.dist[v].unwrap_or(0.0);
            for &(w, _) in &self.out[v] {
                if run.dist[w].is_none() {
                    run.dist[w] = Some(dv + 1.0);
                    queue.push_back(w);
                }
                if run.dist[w].is_some_and(|dw| same_length(dw, dv + 1.0)) {
                    run.sigma[w] += run.sigma[v];
                    run.preds[w].push(v);
                }
            }
        }
        run
    }

    fn dijkstra(&self, s: usize) -> PathRun {
        let mut run = PathRun::start(self.len(), s);
        let mut settled = vec![false; self.len()];
        let mut heap = BinaryHeap::from([Reverse(Frontier { dist: 0.0, vertex: s })]);

        while let Some(Reverse(Frontier { dist: dv, vertex: v })) = heap.pop() {
            if settled[v] {
                continue;
            }
            settled[v] = true;
            run.order.push(v);

            for &(w, len) in &self.out[v] {
                if settled[w] {
                    continue;
                }
                let candidate = dv + len;
                match run.dist[w] {
                    Some(current) if same_length(candidate, current) => {
                        run.sigma[w] += run.sigma[v];
                        run.preds[w].push(v);
                    }
                    Some(current) if candidate > current => {}
                    _ => {
                        run.dist[w] = Some(candidate);
                        run.sigma[w] = run.sigma[v];
                        run.preds[w].clear();
                        run.preds[w].push(v);
                        heap.push(Reverse(Frontier {
                            dist: candidate,
                            vertex: w,
                        }));
                    }
                }
            }
        }
        run
    }
}

/// Heap entry ordered by distance, then vertex index.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    vertex: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.vertex.cmp(&other.vertex))
    }
}

// ---------------------------------------------------------------------------
// PathRun
// ---------------------------------------------------------------------------

/// Result of one single-source search.
#[derive(Debug, Clone)]
pub struct PathRun {
    pub source: usize,
    /// Vertices in non-decreasing distance order (the Brandes stack).
    pub order: Vec<usize>,
    /// `None` = unreachable.
    pub dist: Vec<Option<f64>>,
    /// Number of shortest paths from the source.
    pub sigma: Vec<f64>,
    /// Immediate predecessors on shortest paths.
    pub preds: Vec<Vec<usize>>,
}

impl PathRun {
    fn start(n: usize, s: usize) -> Self {
        let mut dist = vec![None; n];
        let mut sigma = vec![0.0; n];
        dist[s] = Some(0.0);
        sigma[s] = 1.0;
        Self {
            source: s,
            order: Vec::with_capacity(n),
            dist,
            sigma,
            preds: vec![Vec::new(); n],
        }
    }

    /// `(count, total distance)` over vertices reachable from the source,
    /// excluding the source itself.
    #[must_use]
    pub fn reach(&self) -> (usize, f64) {
        self.order
            .iter()
            .filter(|&&v| v != self.source)
            .filter_map(|&v| self.dist[v])
            .fold((0, 0.0), |(count, total), d| (count + 1, total + d))
    }

    /// Largest finite distance from the source.
    #[must_use]
    pub fn eccentricity(&self) -> f64 {
        self.dist.iter().flatten().copied().fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
