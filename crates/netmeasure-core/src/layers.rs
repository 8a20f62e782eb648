//! Layer partitioning.
//!
//! Splits reconciled edges by layer label, in first-seen label order, and
//! produces the concatenated edge list that backs the aggregate graph. A
//! network without labels has exactly one implicit layer, [`IMPLICIT_LAYER`].
//!
//! The plan always holds at least one layer, so later stages iterate
//! uniformly over [`LayerPlan::scopes`] instead of branching on single- vs
//! multi-layer input.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use crate::error::{ConfigIssue, EngineError};
use crate::model::{NetworkInput, NodeId};
use crate::reconcile::Reconciled;

/// Layer name used when no edge carries a label.
pub const IMPLICIT_LAYER: &str = "network";

/// Label reserved for the aggregate pseudo-layer.
pub const AGGREGATE_LABEL: &str = "aggregate";

// ---------------------------------------------------------------------------
// EdgeRow
// ---------------------------------------------------------------------------

/// One row of the output edge list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRow {
    /// Position of the row in the concatenated edge list.
    pub dyad_id: usize,
    /// Internal source index.
    pub ego: usize,
    /// Internal target index.
    pub alter: usize,
    pub ego_id: NodeId,
    pub alter_id: NodeId,
    pub weight: f64,
    /// `None` for unlabelled input.
    pub layer: Option<String>,
}

// ---------------------------------------------------------------------------
// LayerMap
// ---------------------------------------------------------------------------

/// Insertion-ordered mapping from layer name to a per-layer value.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for LayerMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> LayerMap<T> {
    /// Append `value` under `layer`, replacing an existing entry in place.
    pub fn insert(&mut self, layer: impl Into<String>, value: T) {
        let layer = layer.into();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == layer) {
            slot.1 = value;
        } else {
            self.entries.push((layer, value));
        }
    }

    #[must_use]
    pub fn get(&self, layer: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(name, _)| name == layer)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for LayerMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (layer, value) in iter {
            map.insert(layer, value);
        }
        map
    }
}

impl<T: Serialize> Serialize for LayerMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// LayerPlan
// ---------------------------------------------------------------------------

/// Which graph a computation runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Union of every layer's edges.
    Aggregate,
    /// One named layer.
    Layer(String),
}

impl Scope {
    /// Layer name, or `None` for the aggregate.
    #[must_use]
    pub fn layer(&self) -> Option<&str> {
        match self {
            Self::Aggregate => None,
            Self::Layer(name) => Some(name),
        }
    }
}

/// Edges partitioned by layer, plus the concatenated edge list.
#[derive(Debug, Clone)]
pub struct LayerPlan {
    /// Layer names in first-seen order. Never empty.
    pub layers: Vec<String>,
    /// `true` when the input carried no labels.
    pub implicit: bool,
    /// Every edge, grouped by layer in layer order.
    pub edgelist: Vec<EdgeRow>,
    /// Each layer's slice of `edgelist`.
    pub by_layer: LayerMap<Vec<EdgeRow>>,
}

impl LayerPlan {
    #[must_use]
    pub fn is_multilayer(&self) -> bool {
        self.layers.len() > 1
    }

    /// Graphs the downstream stages must run on, aggregate first.
    ///
    /// With one layer the aggregate and the layer coincide and only the
    /// layer is listed.
    #[must_use]
    pub fn scopes(&self) -> Vec<Scope> {
        std::iter::once(self.aggregate_scope())
            .chain(self.layer_scopes())
            .collect()
    }

    /// The scope whose results are reported unprefixed: the aggregate, or
    /// the sole layer when there is only one.
    #[must_use]
    pub fn aggregate_scope(&self) -> Scope {
        match self.layers.as_slice() {
            [sole] => Scope::Layer(sole.clone()),
            _ => Scope::Aggregate,
        }
    }

    /// Layer scopes that need their own pass: every layer when there are
    /// several, none otherwise.
    #[must_use]
    pub fn layer_scopes(&self) -> Vec<Scope> {
        if self.is_multilayer() {
            self.layers.iter().cloned().map(Scope::Layer).collect()
        } else {
            Vec::new()
        }
    }

    /// The edge rows a scope's graph is built from.
    #[must_use]
    pub fn edges_for(&self, scope: &Scope) -> &[EdgeRow] {
        match scope {
            Scope::Aggregate => &self.edgelist,
            Scope::Layer(name) => self.by_layer.get(name).map(Vec::as_slice).unwrap_or_default(),
        }
    }
}

/// Partition `input`'s edges by layer.
///
/// # Errors
///
/// [`EngineError::InvalidConfiguration`] for weights that are not finite and
/// positive,
/// blank or reserved labels, or a mix of labelled and unlabelled edges.
#[instrument(skip(input, reconciled))]
pub fn plan_layers(input: &NetworkInput, reconciled: &Reconciled) -> Result<LayerPlan, EngineError> {
    let labelled = input.edges.iter().filter(|e| e.layer.is_some()).count();
    if labelled != 0 && labelled != input.edges.len() {
        let row = input.edges.iter().position(|e| e.layer.is_none()).unwrap_or(0);
        return Err(EngineError::config(
            ConfigIssue::MixedLayerLabels,
            format!("edge {row}"),
        ));
    }

    let mut layers: Vec<String> = Vec::new();
    let mut layer_of_edge: Vec<usize> = Vec::with_capacity(input.edges.len());
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (row, edge) in input.edges.iter().enumerate() {
        let weight = edge.weight_or_default();
        // Weights are path lengths, and a zero-length tie leaves shortest
        // path counts and closeness undefined.
        if !weight.is_finite() || weight <= 0.0 {
            return Err(EngineError::config(
                ConfigIssue::InvalidWeight,
                format!("edge {row}: {weight}"),
            ));
        }

        let label = edge.layer.as_deref().unwrap_or(IMPLICIT_LAYER);
        if label.trim().is_empty() {
            return Err(EngineError::config(ConfigIssue::BlankLayerLabel, format!("edge {row}")));
        }
        if label == AGGREGATE_LABEL {
            return Err(EngineError::config(ConfigIssue::ReservedLayerLabel, label));
        }

        let next = layers.len();
        let idx = *seen.entry(label).or_insert(next);
        if idx == next {
            layers.push(label.to_string());
        }
        layer_of_edge.push(idx);
    }

    if layers.is_empty() {
        layers.push(IMPLICIT_LAYER.to_string());
    }

    // Stable regroup: layer order first, input order within a layer.
    let mut order: Vec<usize> = (0..input.edges.len()).collect();
    order.sort_by_key(|&row| layer_of_edge[row]);

    let edgelist: Vec<EdgeRow> = order
        .iter()
        .enumerate()
        .map(|(dyad_id, &row)| {
            let edge = &input.edges[row];
            let (ego, alter) = reconciled.endpoints[row];
            EdgeRow {
                dyad_id,
                ego,
                alter,
                ego_id: reconciled.universe.ids()[ego].clone(),
                alter_id: reconciled.universe.ids()[alter].clone(),
                weight: edge.weight_or_default(),
                layer: edge.layer.clone(),
            }
        })
        .collect();

    let by_layer: LayerMap<Vec<EdgeRow>> = layers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let rows = order
                .iter()
                .zip(&edgelist)
                .filter(|(row, _)| layer_of_edge[**row] == idx)
                .map(|(_, edge)| edge.clone())
                .collect();
            (name.clone(), rows)
        })
        .collect();

    debug!(layers = layers.len(), edges = edgelist.len(), "planned layers");

    Ok(LayerPlan {
        layers,
        implicit: labelled == 0,
        edgelist,
        by_layer,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeRecord;
    use crate::reconcile::reconcile;

    fn plan(edges: Vec<EdgeRecord>) -> Result<LayerPlan, EngineError> {
        let input = NetworkInput::new(edges, false);
        let reconciled = reconcile(&input)?;
        plan_layers(&input, &reconciled)
    }

    #[test]
    fn unlabelled_input_has_one_implicit_layer() {
        let p = plan(vec![EdgeRecord::new(1, 2), EdgeRecord::new(2, 3)]).expect("plan");
        assert!(p.implicit);
        assert_eq!(p.layers, vec![IMPLICIT_LAYER.to_string()]);
        assert_eq!(p.scopes(), vec![Scope::Layer(IMPLICIT_LAYER.to_string())]);
        assert_eq!(p.by_layer.get(IMPLICIT_LAYER).map(Vec::len), Some(2));
        assert!(p.edgelist.iter().all(|e| e.layer.is_none()));
    }

    #[test]
    fn empty_input_still_has_a_layer() {
        let p = plan(Vec::new()).expect("plan");
        assert_eq!(p.layers.len(), 1);
        assert!(p.edgelist.is_empty());
        assert_eq!(p.edges_for(&p.scopes()[0]).len(), 0);
    }

    #[test]
    fn layers_in_first_seen_order_and_edges_regrouped() {
        let p = plan(vec![
            EdgeRecord::new("a", "b").in_layer("work"),
            EdgeRecord::new("a", "c").in_layer("kin"),
            EdgeRecord::new("b", "c").in_layer("work"),
        ])
        .expect("plan");

        assert_eq!(p.layers, vec!["work".to_string(), "kin".to_string()]);
        assert!(p.is_multilayer());
        assert_eq!(
            p.scopes(),
            vec![
                Scope::Aggregate,
                Scope::Layer("work".to_string()),
                Scope::Layer("kin".to_string()),
            ]
        );

        let layers: Vec<Option<&str>> = p.edgelist.iter().map(|e| e.layer.as_deref()).collect();
        assert_eq!(layers, vec![Some("work"), Some("work"), Some("kin")]);
        let dyads: Vec<usize> = p.edgelist.iter().map(|e| e.dyad_id).collect();
        assert_eq!(dyads, vec![0, 1, 2]);

        let kin = p.by_layer.get("kin").expect("kin layer");
        assert_eq!(kin.len(), 1);
        assert_eq!(kin[0].dyad_id, 2);
        assert_eq!(kin[0].alter_id, NodeId::from("c"));
    }

    #[test]
    fn single_labelled_layer_runs_once() {
        let p = plan(vec![EdgeRecord::new(1, 2).in_layer("kin")]).expect("plan");
        assert!(!p.implicit);
        assert!(!p.is_multilayer());
        assert_eq!(p.scopes(), vec![Scope::Layer("kin".to_string())]);
    }

    #[test]
    fn mixed_labels_rejected() {
        let err = plan(vec![EdgeRecord::new(1, 2).in_layer("kin"), EdgeRecord::new(2, 3)])
            .expect_err("mixed");
        assert!(matches!(
            err,
            EngineError::InvalidConfiguration {
                issue: ConfigIssue::MixedLayerLabels,
                ..
            }
        ));
    }

    #[test]
    fn blank_and_reserved_labels_rejected() {
        let blank = plan(vec![EdgeRecord::new(1, 2).in_layer("  ")]).expect_err("blank");
        assert!(matches!(
            blank,
            EngineError::InvalidConfiguration {
                issue: ConfigIssue::BlankLayerLabel,
                ..
            }
        ));
        let reserved = plan(vec![EdgeRecord::new(1, 2).in_layer(AGGREGATE_LABEL)])
            .expect_err("reserved");
        assert!(matches!(
            reserved,
            EngineError::InvalidConfiguration {
                issue: ConfigIssue::ReservedLayerLabel,
                ..
            }
        ));
    }

    #[test]
    fn bad_weights_rejected() {
        for w in [f64::NAN, f64::INFINITY, -1.0, 0.0, -0.0] {
            let err = plan(vec![EdgeRecord::new(1, 2).weighted(w)]).expect_err("bad weight");
            assert!(matches!(
                err,
                EngineError::InvalidConfiguration {
                    issue: ConfigIssue::InvalidWeight,
                    ..
                }
            ));
        }
    }

    #[test]
    fn layer_map_keeps_insertion_order_in_json() {
        let mut map = LayerMap::default();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        map.insert("zeta", 3);
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"zeta":3,"alpha":2}"#);
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(map.len(), 2);
    }
}
