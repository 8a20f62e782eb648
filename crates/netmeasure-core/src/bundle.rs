//! Output assembly.
//!
//! Merges the aggregate and per-layer results into one [`Bundle`].
//!
//! # Naming
//!
//! - One layer: node measure columns carry no prefix, and every per-layer
//!   mapping holds the sole layer's results under its name.
//! - Several layers: aggregate columns carry no prefix; each layer's columns
//!   follow as `{layer}_{column}` in layer order.
//!
//! Advisories are deduplicated, aggregate first, then layer order.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::advisory::{Advisory, AdvisoryKind};
use crate::engine::ScopeOutcome;
use crate::error::LayerFailure;
use crate::graph::{Component, NetworkGraph, SystemMeasures, edgelist_hash};
use crate::layers::{EdgeRow, LayerMap, LayerPlan};
use crate::metrics::NodeMeasureTable;
use crate::model::NetworkInput;
use crate::reconcile::{AttributeTable, Reconciled};

/// Everything one engine invocation produces.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    pub network_name: Option<String>,
    pub directed: bool,
    /// Layer names in first-seen order. Never empty.
    pub layers: Vec<String>,
    pub edgelist: Vec<EdgeRow>,
    pub edgelist_by_layer: LayerMap<Vec<EdgeRow>>,
    pub edgelist_hash: String,
    pub attributes: AttributeTable,
    pub node_measures: NodeMeasureTable,
    pub node_measures_by_layer: LayerMap<NodeMeasureTable>,
    /// Aggregate row first (when there are several layers), then layers.
    pub system_measures: Vec<SystemMeasures>,
    pub graph: NetworkGraph,
    pub graph_by_layer: LayerMap<NetworkGraph>,
    pub largest_component: Component,
    pub largest_component_by_layer: LayerMap<Component>,
    #[serde(rename = "largest_biconnected_component")]
    pub largest_bicomponent: Component,
    #[serde(rename = "largest_biconnected_component_by_layer")]
    pub largest_bicomponent_by_layer: LayerMap<Component>,
    pub advisories: Vec<Advisory>,
    pub failed_layers: Vec<LayerFailure>,
}

impl Bundle {
    /// System row for a layer (`None` = aggregate, or the sole layer).
    #[must_use]
    pub fn system_row(&self, layer: Option<&str>) -> Option<&SystemMeasures> {
        match layer {
            Some(name) => self
                .system_measures
                .iter()
                .find(|row| row.layer.as_deref() == Some(name)),
            None => self.system_measures.first(),
        }
    }

    #[must_use]
    pub fn is_multilayer(&self) -> bool {
        self.layers.len() > 1
    }

    /// Advisory messages as display strings.
    #[must_use]
    pub fn advisory_messages(&self) -> Vec<String> {
        self.advisories.iter().map(ToString::to_string).collect()
    }
}

/// Keep the first occurrence of each advisory.
fn dedup_advisories(advisories: Vec<Advisory>) -> Vec<Advisory> {
    let mut seen = HashSet::new();
    advisories
        .into_iter()
        .filter(|advisory| seen.insert(advisory.clone()))
        .collect()
}

/// Split one outcome into its bundle contributions, recording failures.
fn unpack(
    outcome: ScopeOutcome,
    advisories: &mut Vec<Advisory>,
    failed: &mut Vec<LayerFailure>,
) -> (NetworkGraph, Component, Component, Option<(NodeMeasureTable, SystemMeasures)>) {
    if let Some(failure) = outcome.failure() {
        advisories.push(Advisory::new(
            failure.layer.as_deref(),
            None,
            AdvisoryKind::LayerFailed,
            format!("measures omitted: {}", failure.error),
        ));
        failed.push(failure);
    }

    let measured = outcome.analysis.ok().map(|analysis| {
        advisories.extend(analysis.nodes.advisories);
        (analysis.nodes.table, analysis.system)
    });

    (
        outcome.graph,
        outcome.components.largest_component,
        outcome.components.largest_bicomponent,
        measured,
    )
}

/// Merge scope outcomes into the final bundle.
///
/// `per_layer` is empty for single-layer input; the aggregate outcome then
/// also stands for the sole layer.
pub(crate) fn assemble(
    input: &NetworkInput,
    reconciled: Reconciled,
    plan: LayerPlan,
    aggregate: ScopeOutcome,
    per_layer: Vec<ScopeOutcome>,
) -> Bundle {
    let mut advisories = Vec::new();
    let mut failed_layers = Vec::new();

    let mut graph_by_layer = LayerMap::default();
    let mut largest_component_by_layer = LayerMap::default();
    let mut largest_bicomponent_by_layer = LayerMap::default();
    let mut node_measures_by_layer = LayerMap::default();
    let mut system_measures = Vec::new();

    let sole_layer = aggregate.scope.layer().map(str::to_string);
    let (graph, largest_component, largest_bicomponent, measured) =
        unpack(aggregate, &mut advisories, &mut failed_layers);

    let mut node_measures = match measured {
        Some((table, system)) => {
            system_measures.push(system);
            if let Some(name) = &sole_layer {
                node_measures_by_layer.insert(name.clone(), table.clone());
            }
            table
        }
        None => NodeMeasureTable::new(reconciled.universe.ids().to_vec()),
    };
    if let Some(name) = &sole_layer {
        graph_by_layer.insert(name.clone(), graph.clone());
        largest_component_by_layer.insert(name.clone(), largest_component.clone());
        largest_bicomponent_by_layer.insert(name.clone(), largest_bicomponent.clone());
    }

    for outcome in per_layer {
        let Some(name) = outcome.scope.layer().map(str::to_string) else {
            continue;
        };
        let (layer_graph, component, bicomponent, measured) =
            unpack(outcome, &mut advisories, &mut failed_layers);

        if let Some((table, system)) = measured {
            node_measures.extend_prefixed(&name, &table);
            system_measures.push(system);
            node_measures_by_layer.insert(name.clone(), table);
        }
        graph_by_layer.insert(name.clone(), layer_graph);
        largest_component_by_layer.insert(name.clone(), component);
        largest_bicomponent_by_layer.insert(name, bicomponent);
    }

    let advisories = dedup_advisories(advisories);
    for advisory in &advisories {
        warn!(%advisory, kind = ?advisory.kind, "measurement advisory");
    }

    Bundle {
        network_name: input.network_name.clone(),
        directed: input.directed,
        layers: plan.layers,
        edgelist_hash: edgelist_hash(&plan.edgelist),
        edgelist: plan.edgelist,
        edgelist_by_layer: plan.by_layer,
        attributes: reconciled.attributes,
        node_measures,
        node_measures_by_layer,
        system_measures,
        graph,
        graph_by_layer,
        largest_component,
        largest_component_by_layer,
        largest_bicomponent,
        largest_bicomponent_by_layer,
        advisories,
        failed_layers,
    }
}
