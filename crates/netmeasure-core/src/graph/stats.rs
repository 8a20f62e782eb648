//! Whole-graph summary statistics.
//!
//! # Statistics Provided
//!
//! - **density**: distinct non-loop dyads present over dyads possible,
//!   `n(n-1)` ordered pairs when directed and `n(n-1)/2` otherwise. Zero for
//!   graphs with 0 or 1 vertex.
//! - **reciprocity**: directed only. Share of distinct non-loop directed ties
//!   whose reverse tie also exists.
//! - **transitivity**: global clustering on the undirected simple view.
//! - **diameter**: longest shortest path. When the graph is disconnected it
//!   is measured on the largest weak component and `diameter_restricted` is
//!   set.
//! - **average_path_length**: mean over all reachable ordered pairs.
//! - **self_loop_count**, **multi_edge_count**: ties beyond the first for
//!   each vertex pair (loops included), counting direction when directed.
//! - Component counts and sizes come from the [`ComponentReport`].
//!
//! Nothing here fails on empty, trivial or disconnected graphs: undefined
//! ratios are `None`.

use std::collections::HashSet;

use serde::Serialize;
use tracing::instrument;

use super::build::NetworkGraph;
use super::components::ComponentReport;
use super::paths::Adjacency;
use crate::metrics::{Column, ColumnData, NodeMeasureTable};
use crate::metrics::degree::degrees;
use crate::metrics::transitivity::global_transitivity;

// ---------------------------------------------------------------------------
// SystemMeasures
// ---------------------------------------------------------------------------

/// One row of the system measure table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemMeasures {
    /// `None` = aggregate graph.
    pub layer: Option<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub directed: bool,
    pub weighted: bool,
    pub density: f64,
    pub reciprocity: Option<f64>,
    pub transitivity: Option<f64>,
    pub diameter: Option<f64>,
    /// `true` when `diameter` was measured on the largest component only.
    pub diameter_restricted: bool,
    pub average_path_length: Option<f64>,
    pub mean_degree: f64,
    pub self_loop_count: usize,
    pub multi_edge_count: usize,
    pub isolate_count: usize,
    pub weak_component_count: usize,
    /// Directed graphs only.
    pub strong_component_count: Option<usize>,
    pub largest_component_size: usize,
    pub bicomponent_count: usize,
    pub largest_bicomponent_size: usize,
}

impl SystemMeasures {
    /// Summarize `g` given its node measures and components.
    ///
    /// Degree figures are read from the `total_degree` column when the
    /// table has one and recomputed from `g` otherwise.
    #[must_use]
    #[instrument(skip_all, fields(layer = layer.unwrap_or("aggregate")))]
    pub fn compute(
        layer: Option<&str>,
        g: &NetworkGraph,
        nodes: &NodeMeasureTable,
        components: &ComponentReport,
    ) -> Self {
        let n = g.vertex_count();
        let total_degree: Vec<u64> = match nodes.column("total_degree") {
            Some(Column {
                values: ColumnData::Integer(values),
                ..
            }) if values.len() == n => values.clone(),
            _ => degrees(g).total_degree,
        };

        let mean_degree = if n == 0 {
            0.0
        } else {
            total_degree.iter().sum::<u64>() as f64 / n as f64
        };

        let paths = Adjacency::for_paths(g);
        let diameter_graph = if components.disconnected {
            Adjacency::for_paths(&components.largest_component.graph)
        } else {
            paths.clone()
        };

        Self {
            layer: layer.map(str::to_string),
            node_count: n,
            edge_count: g.edge_count(),
            directed: g.directed(),
            weighted: g.weighted(),
            density: density(g),
            reciprocity: reciprocity(g),
            transitivity: global_transitivity(&Adjacency::undirected(g)),
            diameter: diameter(&diameter_graph),
            diameter_restricted: components.disconnected,
            average_path_length: average_path_length(&paths),
            mean_degree,
            self_loop_count: g.ties().filter(|(s, t, _)| s == t).count(),
            multi_edge_count: g.edge_count() - dyad_keys(g, true).len(),
            isolate_count: total_degree.iter().filter(|&&d| d == 0).count(),
            weak_component_count: components.weak_component_count,
            strong_component_count: components.strong_component_count,
            largest_component_size: components.largest_component.len(),
            bicomponent_count: components.bicomponent_count,
            largest_bicomponent_size: components.largest_bicomponent.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Distinct vertex pairs carrying a tie, oriented when directed.
fn dyad_keys(g: &NetworkGraph, include_loops: bool) -> HashSet<(usize, usize)> {
    g.ties()
        .filter(|(s, t, _)| include_loops || s != t)
        .map(|(s, t, _)| if g.directed() { (s, t) } else { (s.min(t), s.max(t)) })
        .collect()
}

fn density(g: &NetworkGraph) -> f64 {
    let n = g.vertex_count();
    if n <= 1 {
        return 0.0;
    }
    let possible = if g.directed() {
        n * (n - 1)
    } else {
        n * (n - 1) / 2
    };
    dyad_keys(g, false).len() as f64 / possible as f64
}

fn reciprocity(g: &NetworkGraph) -> Option<f64> {
    if !g.directed() {
        return None;
    }
    let ties = dyad_keys(g, false);
    if ties.is_empty() {
        return None;
    }
    let mutual = ties.iter().filter(|&&(s, t)| ties.contains(&(t, s))).count();
    Some(mutual as f64 / ties.len() as f64)
}

/// Largest finite distance, `None` without any reachable pair.
fn diameter(adj: &Adjacency) -> Option<f64> {
    (0..adj.len())
        .map(|s| adj.shortest_paths(s))
        .filter(|run| run.reach().0 > 0)
        .map(|run| run.eccentricity())
        .reduce(f64::max)
}

fn average_path_length(adj: &Adjacency) -> Option<f64> {
    let (pairs, total) = (0..adj.len())
        .map(|s| adj.shortest_paths(s).reach())
        .fold((0usize, 0.0), |(p, t), (c, d)| (p + c, t + d));
    (pairs > 0).then(|| total / pairs as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
