//! Connected and biconnected component extraction.
//!
//! # Weak components
//!
//! Direction is ignored (weak connectivity for directed graphs). Components
//! are listed in order of their lowest vertex index, members ascending, so
//! "largest, first found" is a deterministic choice.
//!
//! # Biconnected components
//!
//! Computed on the undirected simple view of the graph (direction, parallel
//! ties and self-loops collapsed for this computation only) with an iterative
//! Hopcroft–Tarjan edge-stack DFS. Roots and neighbours are visited in
//! ascending index order; blocks are recorded in the order the DFS closes
//! them. Isolated vertices belong to no block.

use petgraph::algo::kosaraju_scc;
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use tracing::instrument;

use super::build::NetworkGraph;
use super::paths::Adjacency;

/// A vertex subset together with its owned induced subgraph.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    /// Universe indices of the members, ascending.
    pub vertices: Vec<usize>,
    pub graph: NetworkGraph,
}

impl Component {
    fn induced(parent: &NetworkGraph, local: &[usize]) -> Self {
        let graph = parent.induced_subgraph(local);
        Self {
            vertices: local.iter().map(|&v| parent.universe_index(v)).collect(),
            graph,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Weak components as local vertex lists.
#[must_use]
pub fn weak_components(g: &NetworkGraph) -> Vec<Vec<usize>> {
    let n = g.vertex_count();
    let mut sets = UnionFind::<usize>::new(n);
    for (s, t, _) in g.ties() {
        sets.union(s, t);
    }

    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for v in 0..n {
        let root = sets.find_mut(v);
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(v);
    }
    components
}

/// Number of strongly connected components (directed graphs only).
#[must_use]
pub fn strong_component_count(g: &NetworkGraph) -> Option<usize> {
    g.directed().then(|| kosaraju_scc(&g.graph).len())
}

/// Biconnected blocks as local vertex lists (ascending), in closing order.
#[must_use]
pub fn biconnected_components(g: &NetworkGraph) -> Vec<Vec<usize>> {
    let adj = Adjacency::undirected(g);
    let n = adj.len();
    let unvisited = usize::MAX;

    let mut disc = vec![unvisited; n];
    let mut low = vec![0usize; n];
    let mut time = 0usize;
    let mut edge_stack: Vec<(usize, usize)> = Vec::new();
    let mut blocks: Vec<Vec<usize>> = Vec::new();
    let mut in_block = vec![false; n];

    for root in 0..n {
        if disc[root] != unvisited || adj.out[root].is_empty() {
            continue;
        }
        disc[root] = time;
        low[root] = time;
        time += 1;

        // Frame: (vertex, parent, next neighbour position).
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, unvisited, 0)];

        while let Some(frame) = stack.last_mut() {
            let (v, parent, pos) = *frame;
            if let Some(&(w, _)) = adj.out[v].get(pos) {
                frame.2 += 1;
                if disc[w] == unvisited {
                    edge_stack.push((v, w));
                    disc[w] = time;
                    low[w] = time;
                    time += 1;
                    stack.push((w, v, 0));
                } else if w != parent && disc[w] < disc[v] {
                    edge_stack.push((v, w));
                    low[v] = low[v].min(disc[w]);
                }
                continue;
            }

            stack.pop();
            let Some(&(u, _, _)) = stack.last() else {
                continue;
            };
            low[u] = low[u].min(low[v]);
            if low[v] >= disc[u] {
                let mut block = Vec::new();
                while let Some((a, b)) = edge_stack.pop() {
                    for x in [a, b] {
                        if !in_block[x] {
                            in_block[x] = true;
                            block.push(x);
                        }
                    }
                    if (a, b) == (u, v) {
                        break;
                    }
                }
                for &x in &block {
                    in_block[x] = false;
                }
                block.sort_unstable();
                blocks.push(block);
            }
        }
    }
    blocks
}

/// Largest of `groups` by size, earliest on ties. `None` when empty.
fn largest(groups: &[Vec<usize>]) -> Option<&Vec<usize>> {
    groups
        .iter()
        .enumerate()
        .max_by(|(i, a), (j, b)| a.len().cmp(&b.len()).then(j.cmp(i)))
        .map(|(_, group)| group)
}

/// Everything the component stage hands to later stages.
#[derive(Debug, Clone)]
pub struct ComponentReport {
    pub weak_component_count: usize,
    pub strong_component_count: Option<usize>,
    pub bicomponent_count: usize,
    pub largest_component: Component,
    pub largest_bicomponent: Component,
    /// `true` when there is more than one weak component.
    pub disconnected: bool,
}

/// Extract the largest weak component and the largest biconnected block.
///
/// Empty graphs yield empty components; a graph without ties yields its
/// first vertex as the largest component and an empty bicomponent.
#[must_use]
#[instrument(skip(g), fields(vertices = g.vertex_count(), ties = g.edge_count()))]
pub fn extract_components(g: &NetworkGraph) -> ComponentReport {
    let weak = weak_components(g);
    let blocks = biconnected_components(g);

    let largest_component = largest(&weak)
        .map_or_else(|| Component::induced(g, &[]), |c| Component::induced(g, c));
    let largest_bicomponent = largest(&blocks)
        .map_or_else(|| Component::induced(g, &[]), |b| Component::induced(g, b));

    ComponentReport {
        weak_component_count: weak.len(),
        strong_component_count: strong_component_count(g),
        bicomponent_count: blocks.len(),
        largest_component,
        largest_bicomponent,
        disconnected: weak.len() > 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::unweighted;

    #[test]
    fn empty_graph_has_empty_components() {
        let report = extract_components(&unweighted(0, &[], false));
        assert_eq!(report.weak_component_count, 0);
        assert!(report.largest_component.is_empty());
        assert!(report.largest_bicomponent.is_empty());
        assert!(!report.disconnected);
    }

    #[test]
    fn directed_triangle_is_one_block() {
        let report = extract_components(&unweighted(3, &[(0, 1), (1, 2), (2, 0)], true));
        assert_eq!(report.weak_component_count, 1);
        assert_eq!(report.strong_component_count, Some(1));
        assert_eq!(report.bicomponent_count, 1);
        assert_eq!(report.largest_bicomponent.vertices, vec![0, 1, 2]);
        assert_eq!(report.largest_bicomponent.graph.edge_count(), 3);
        assert!(report.largest_bicomponent.graph.directed());
    }

    #[test]
    fn two_pairs_and_an_isolate() {
        let g = unweighted(5, &[(0, 1), (2, 3)], false);
        let weak = weak_components(&g);
        assert_eq!(weak, vec![vec![0, 1], vec![2, 3], vec![4]]);

        let report = extract_components(&g);
        assert_eq!(report.weak_component_count, 3);
        assert!(report.disconnected);
        assert_eq!(report.largest_component.vertices, vec![0, 1], "tie goes to first found");
        assert_eq!(report.bicomponent_count, 2);
        assert_eq!(report.largest_bicomponent.vertices, vec![0, 1]);
        assert_eq!(report.strong_component_count, None);
    }

    #[test]
    fn bowtie_splits_at_cut_vertex() {
        // Two triangles sharing vertex 2.
        let g = unweighted(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)], false);
        let blocks = biconnected_components(&g);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.contains(&vec![0, 1, 2]));
        assert!(blocks.contains(&vec![2, 3, 4]));
    }

    #[test]
    fn path_has_one_block_per_edge() {
        let g = unweighted(4, &[(0, 1), (1, 2), (2, 3)], false);
        let blocks = biconnected_components(&g);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn largest_block_beats_earlier_small_blocks() {
        // Pendant edge 0-1, then square 1-2-3-4.
        let g = unweighted(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 1)], false);
        let report = extract_components(&g);
        assert_eq!(report.bicomponent_count, 2);
        assert_eq!(report.largest_bicomponent.vertices, vec![1, 2, 3, 4]);
        assert_eq!(report.largest_bicomponent.graph.edge_count(), 4);
    }

    #[test]
    fn multi_edges_and_loops_do_not_create_blocks() {
        let g = unweighted(2, &[(0, 1), (1, 0), (0, 1), (1, 1)], true);
        let blocks = biconnected_components(&g);
        assert_eq!(blocks, vec![vec![0, 1]]);
        let report = extract_components(&g);
        // The subgraph still carries every original tie.
        assert_eq!(report.largest_bicomponent.graph.edge_count(), 4);
        assert_eq!(report.strong_component_count, Some(1));
    }

    #[test]
    fn component_subgraph_is_independent() {
        let g = unweighted(4, &[(0, 1), (1, 2)], false);
        let report = extract_components(&g);
        drop(g);
        assert_eq!(report.largest_component.vertices, vec![0, 1, 2]);
        assert_eq!(report.largest_component.graph.edge_count(), 2);
    }
}
