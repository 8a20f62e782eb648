//! Node measure tables.
//!
//! One row per universe vertex, one column per computed metric. Columns for
//! metrics that are invalid under a graph's configuration are absent, never
//! filled with placeholders. A `null` cell means "not applicable for this
//! vertex" (for example closeness of a vertex that reaches nobody).

use serde::Serialize;

use crate::model::NodeId;

/// Column values: counts or real-valued scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Integer(Vec<u64>),
    Real(Vec<Option<f64>>),
}

impl ColumnData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(values) => values.len(),
            Self::Real(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnData,
}

/// Metric columns keyed by vertex, led by the external identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMeasureTable {
    pub ids: Vec<NodeId>,
    pub columns: Vec<Column>,
}

impl NodeMeasureTable {
    #[must_use]
    pub const fn new(ids: Vec<NodeId>) -> Self {
        Self {
            ids,
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, values: ColumnData) {
        debug_assert_eq!(values.len(), self.ids.len());
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    /// Append `other`'s columns renamed `{prefix}_{name}`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: &Self) {
        for column in &other.columns {
            self.columns.push(Column {
                name: format!("{prefix}_{}", column.name),
                values: column.values.clone(),
            });
        }
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Integer cell, `None` if the column is missing or not an integer column.
    #[must_use]
    pub fn integer(&self, name: &str, vertex: usize) -> Option<u64> {
        match &self.column(name)?.values {
            ColumnData::Integer(values) => values.get(vertex).copied(),
            ColumnData::Real(_) => None,
        }
    }

    /// Real cell, `None` if missing, not applicable, or not a real column.
    #[must_use]
    pub fn real(&self, name: &str, vertex: usize) -> Option<f64> {
        match &self.column(name)?.values {
            ColumnData::Real(values) => values.get(vertex).copied().flatten(),
            ColumnData::Integer(_) => None,
        }
    }

    /// Row index of an external identifier.
    #[must_use]
    pub fn row_of(&self, id: &NodeId) -> Option<usize> {
        let key = id.key();
        self.ids.iter().position(|candidate| candidate.key() == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
