//! Caller-facing record shapes.
//!
//! These mirror the engine entry contract: an edge list with optional weights
//! and layer labels, an optional node table, and a directedness flag. Format
//! ingestion happens elsewhere; the engine only ever sees these values.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An external vertex identifier as supplied by the caller.
///
/// `Integer(1)` and `Text("1")` name the same vertex; see [`NodeId::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Integer(i64),
    Text(String),
}

impl NodeId {
    /// Canonical text used to reconcile identifiers across sources.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NodeId {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for NodeId {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A categorical or numeric attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `2^63`: whole floats at or beyond this magnitude do not fit an `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl AttrValue {
    /// The integer a whole, in-range `Number` (or an `Integer`) stands for.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Number(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < I64_LIMIT => {
                Some(*x as i64)
            }
            _ => None,
        }
    }

    /// Equality that treats `30` and `30.0` as the same value.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(n), x @ Self::Number(_)) | (x @ Self::Number(_), Self::Integer(n)) => {
                x.as_integer() == Some(*n)
            }
            _ => self == other,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// One tie as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    /// Defaults to 1 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

impl EdgeRecord {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: None,
            layer: None,
        }
    }

    #[must_use]
    pub const fn weighted(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn in_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// The weight with the default applied.
    #[must_use]
    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// One row of the node table: column name to value, in column order.
///
/// A `null` cell is stored as `None` and treated as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRecord {
    pub fields: Vec<(String, Option<AttrValue>)>,
}

impl NodeRecord {
    /// Start a row holding only its identifier.
    pub fn new(id_column: &str, id: impl Into<NodeId>) -> Self {
        let value = match id.into() {
            NodeId::Integer(n) => AttrValue::Integer(n),
            NodeId::Text(s) => AttrValue::Text(s),
        };
        Self {
            fields: vec![(id_column.to_string(), Some(value))],
        }
    }

    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<AttrValue>) -> Self {
        self.fields.push((column.to_string(), Some(value.into())));
        self
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&AttrValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_ref())
    }
}

impl Serialize for NodeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de> Deserialize<'de> for NodeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = NodeRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a node attribute record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NodeRecord, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Option<AttrValue>>()? {
                    fields.push((key, value));
                }
                Ok(NodeRecord { fields })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

fn default_id_column() -> String {
    "id".to_string()
}

/// Everything one engine invocation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInput {
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub directed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeRecord>>,
    #[serde(default = "default_id_column")]
    pub node_id_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
}

impl NetworkInput {
    #[must_use]
    pub fn new(edges: Vec<EdgeRecord>, directed: bool) -> Self {
        Self {
            edges,
            directed,
            nodes: None,
            node_id_column: default_id_column(),
            network_name: None,
        }
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<NodeRecord>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    #[must_use]
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.node_id_column = column.into();
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.network_name = Some(name.into());
        self
    }
}
