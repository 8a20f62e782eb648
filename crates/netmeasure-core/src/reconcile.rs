//! Identifier reconciliation.
//!
//! Unifies the identifiers found in edge endpoints and in the optional node
//! table into one ordered, deduplicated [`VertexUniverse`] with dense indices
//! `0..n`, and lays node attributes out as a typed [`AttributeTable`] joined
//! to the universe by index.
//!
//! ## Ordering
//!
//! Node-table identifiers come first, in table order. Edge endpoints that the
//! node table does not mention follow in first-seen order (source before
//! target within an edge). Without a node table the universe is simply the
//! first-seen order of endpoints.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{ConfigIssue, EngineError};
use crate::model::{AttrValue, NetworkInput, NodeId, NodeRecord};

// ---------------------------------------------------------------------------
// VertexUniverse
// ---------------------------------------------------------------------------

/// Ordered, deduplicated external identifiers mapped 1:1 to `0..n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexUniverse {
    ids: Vec<NodeId>,
    index: HashMap<String, usize>,
}

impl VertexUniverse {
    /// Add `id` if unseen and return its index either way.
    fn intern(&mut self, id: &NodeId) -> usize {
        let next = self.ids.len();
        let idx = *self.index.entry(id.key()).or_insert(next);
        if idx == next {
            self.ids.push(id.clone());
        }
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// External identifier of vertex `idx`.
    #[must_use]
    pub fn id(&self, idx: usize) -> Option<&NodeId> {
        self.ids.get(idx)
    }

    /// Dense index of an external identifier.
    #[must_use]
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(&id.key()).copied()
    }
}

// ---------------------------------------------------------------------------
// AttributeTable
// ---------------------------------------------------------------------------

/// One attribute column, indexed by vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeColumn {
    pub name: String,
    pub values: Vec<Option<AttrValue>>,
}

/// Node attributes kept apart from graph topology.
///
/// Every column has exactly one slot per universe vertex. Vertices the node
/// table never described hold `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeTable {
    pub columns: Vec<AttributeColumn>,
}

impl AttributeTable {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&AttributeColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Attribute `name` of vertex `idx`, if present.
    #[must_use]
    pub fn get(&self, idx: usize, name: &str) -> Option<&AttrValue> {
        self.column(name)
            .and_then(|c| c.values.get(idx))
            .and_then(Option::as_ref)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Output of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub universe: VertexUniverse,
    pub attributes: AttributeTable,
    /// `(source, target)` universe indices, parallel to the input edges.
    pub endpoints: Vec<(usize, usize)>,
}

/// Build the vertex universe and attribute table for `input`.
///
/// # Errors
///
/// - [`EngineError::IdentifierConflict`] when two node rows share an
///   identifier but disagree on some attribute.
/// - [`EngineError::InvalidConfiguration`] when a node row has no usable
///   identifier.
#[instrument(skip(input), fields(edges = input.edges.len()))]
pub fn reconcile(input: &NetworkInput) -> Result<Reconciled, EngineError> {
    let mut universe = VertexUniverse::default();
    let mut rows: Vec<Option<&NodeRecord>> = Vec::new();

    if let Some(nodes) = &input.nodes {
        for (row_no, record) in nodes.iter().enumerate() {
            let id = row_id(record, &input.node_id_column, row_no)?;
            let idx = universe.intern(&id);
            if idx == rows.len() {
                rows.push(Some(record));
            } else if let Some(Some(earlier)) = rows.get(idx) {
                check_consistent(&id, earlier, record, &input.node_id_column)?;
            }
        }
    }

    let endpoints: Vec<(usize, usize)> = input
        .edges
        .iter()
        .map(|edge| (universe.intern(&edge.source), universe.intern(&edge.target)))
        .collect();

    rows.resize(universe.len(), None);
    let attributes = lay_out_attributes(&rows, &input.node_id_column);

    debug!(
        vertices = universe.len(),
        attribute_columns = attributes.columns.len(),
        "reconciled identifiers"
    );

    Ok(Reconciled {
        universe,
        attributes,
        endpoints,
    })
}

/// Extract a row's identifier from the configured id column.
fn row_id(record: &NodeRecord, id_column: &str, row_no: usize) -> Result<NodeId, EngineError> {
    match record.get(id_column) {
        None => Err(EngineError::config(
            ConfigIssue::MissingNodeId,
            format!("row {row_no} (column `{id_column}`)"),
        )),
        Some(AttrValue::Text(s)) => Ok(NodeId::Text(s.clone())),
        Some(value) => value.as_integer().map(NodeId::Integer).ok_or_else(|| {
            EngineError::config(ConfigIssue::InvalidNodeId, format!("row {row_no}: {value}"))
        }),
    }
}

/// Attribute cells of a row, excluding the id column and missing values.
fn present_cells<'a>(record: &'a NodeRecord, id_column: &str) -> BTreeMap<&'a str, &'a AttrValue> {
    record
        .fields
        .iter()
        .filter(|(name, _)| name != id_column)
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
        .collect()
}

fn check_consistent(
    id: &NodeId,
    first: &NodeRecord,
    second: &NodeRecord,
    id_column: &str,
) -> Result<(), EngineError> {
    let a = present_cells(first, id_column);
    let b = present_cells(second, id_column);
    let conflict = a.keys().chain(b.keys()).find(|name| match (a.get(*name), b.get(*name)) {
        (Some(x), Some(y)) => !x.same_value(y),
        (x, y) => x.is_some() != y.is_some(),
    });
    match conflict {
        None => Ok(()),
        Some(column) => Err(EngineError::IdentifierConflict {
            id: id.to_string(),
            column: (*column).to_string(),
        }),
    }
}

/// Turn per-vertex rows into columns, keeping first-seen column order.
fn lay_out_attributes(rows: &[Option<&NodeRecord>], id_column: &str) -> AttributeTable {
    let mut columns: Vec<AttributeColumn> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for record in rows.iter().flatten() {
        for (name, _) in &record.fields {
            if name == id_column || position.contains_key(name.as_str()) {
                continue;
            }
            position.insert(name.as_str(), columns.len());
            columns.push(AttributeColumn {
                name: name.clone(),
                values: vec![None; rows.len()],
            });
        }
    }

    for (vertex, record) in rows.iter().enumerate() {
        let Some(record) = record else { continue };
        for (name, value) in &record.fields {
            if let Some(&col) = position.get(name.as_str()) {
                columns[col].values[vertex].clone_from(value);
            }
        }
    }

    AttributeTable { columns }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
