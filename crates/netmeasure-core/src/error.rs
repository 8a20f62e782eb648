//! Error types for the measurement engine.
//!
//! Fatal errors ([`EngineError`]) abort an invocation before any graph is
//! built, except [`EngineError::LayerFailures`], which is raised after every
//! layer has run. Per-layer numeric failures are [`MeasureError`] values and
//! never abort sibling layers.

use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    IdentifierConflict,
    MissingNodeId,
    InvalidNodeId,
    InvalidWeight,
    MalformedLayerLabel,
    UnknownMetric,
    DirectedOnlyMetric,
    SingularSystem,
    NonFiniteScore,
    LayerFailures,
    ConfigParseError,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::IdentifierConflict => "E1001",
            Self::MissingNodeId => "E1002",
            Self::InvalidNodeId => "E1003",
            Self::InvalidWeight => "E1004",
            Self::MalformedLayerLabel => "E2001",
            Self::UnknownMetric => "E2002",
            Self::DirectedOnlyMetric => "E2003",
            Self::ConfigParseError => "E2004",
            Self::SingularSystem => "E3001",
            Self::NonFiniteScore => "E3002",
            Self::LayerFailures => "E3003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::IdentifierConflict => "Conflicting attribute rows for one identifier",
            Self::MissingNodeId => "Node row has no identifier",
            Self::InvalidNodeId => "Node identifier is not a string or integer",
            Self::InvalidWeight => "Edge weight is not a positive finite number",
            Self::MalformedLayerLabel => "Malformed layer label",
            Self::UnknownMetric => "Unknown metric name",
            Self::DirectedOnlyMetric => "Directed-only metric requested for undirected network",
            Self::ConfigParseError => "Config file parse error",
            Self::SingularSystem => "Linear system is singular",
            Self::NonFiniteScore => "Metric produced a non-finite score",
            Self::LayerFailures => "One or more layers failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::IdentifierConflict => {
                Some("Deduplicate the node table so each identifier has one attribute row.")
            }
            Self::MissingNodeId => Some("Check `node_id_column` against the node table headers."),
            Self::InvalidNodeId => Some("Use string or integer identifiers in the node table."),
            Self::InvalidWeight => Some("Weights must be finite and greater than zero. Drop zero-weight ties."),
            Self::MalformedLayerLabel => Some(
                "Label every edge with a non-blank layer other than `aggregate`, or label none.",
            ),
            Self::UnknownMetric => Some("Run `netmeasure config` to list the metric names."),
            Self::DirectedOnlyMetric => {
                Some("Drop the metric from `metrics.requested` or mark the network directed.")
            }
            Self::ConfigParseError => Some("Fix syntax in the engine config file and retry."),
            Self::SingularSystem => {
                Some("Lower `metrics.bonacich_beta_ratio` below 1.0 and retry.")
            }
            Self::NonFiniteScore => None,
            Self::LayerFailures => {
                Some("Set `execution.allow_partial = true` to keep the layers that succeeded.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What was wrong with the caller's configuration or records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssue {
    MissingNodeId,
    InvalidNodeId,
    InvalidWeight,
    BlankLayerLabel,
    ReservedLayerLabel,
    MixedLayerLabels,
    UnknownMetric,
    DirectedOnlyMetric,
}

impl ConfigIssue {
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::MissingNodeId => ErrorCode::MissingNodeId,
            Self::InvalidNodeId => ErrorCode::InvalidNodeId,
            Self::InvalidWeight => ErrorCode::InvalidWeight,
            Self::BlankLayerLabel | Self::ReservedLayerLabel | Self::MixedLayerLabels => {
                ErrorCode::MalformedLayerLabel
            }
            Self::UnknownMetric => ErrorCode::UnknownMetric,
            Self::DirectedOnlyMetric => ErrorCode::DirectedOnlyMetric,
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingNodeId => "node row lacks the identifier column",
            Self::InvalidNodeId => "node identifier must be a string or integer",
            Self::InvalidWeight => "edge weight must be finite and positive",
            Self::BlankLayerLabel => "layer label is blank",
            Self::ReservedLayerLabel => "layer label is reserved",
            Self::MixedLayerLabels => "some edges carry a layer label and some do not",
            Self::UnknownMetric => "unknown metric",
            Self::DirectedOnlyMetric => "metric is only defined for directed networks",
        };
        f.write_str(text)
    }
}

/// A numeric failure isolated to one layer's computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    /// `(I - βA)` could not be inverted.
    #[error("{metric}: linear system is singular (beta = {beta})")]
    SingularSystem { metric: &'static str, beta: f64 },
    /// A metric produced NaN or an infinity for a vertex.
    #[error("{metric}: non-finite score for vertex `{vertex}`")]
    NonFiniteScore { metric: &'static str, vertex: String },
}

impl MeasureError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SingularSystem { .. } => ErrorCode::SingularSystem,
            Self::NonFiniteScore { .. } => ErrorCode::NonFiniteScore,
        }
    }
}

/// A [`MeasureError`] tagged with the layer it happened in.
///
/// `layer == None` is the aggregate graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayerFailure {
    pub layer: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    pub error: MeasureError,
}

impl fmt::Display for LayerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layer {
            Some(layer) => write!(f, "layer `{layer}`: {}", self.error),
            None => write!(f, "aggregate: {}", self.error),
        }
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &MeasureError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Fatal engine errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The node table holds two different attribute rows for one identifier.
    #[error("identifier `{id}` has conflicting attribute rows ({column} differs)")]
    IdentifierConflict { id: String, column: String },
    /// The records or the engine config are unusable as supplied.
    #[error("invalid configuration: {issue}: `{value}`")]
    InvalidConfiguration { issue: ConfigIssue, value: String },
    /// At least one layer failed and partial results were not allowed.
    #[error("{} layer(s) failed: {}", .0.len(), join_failures(.0))]
    LayerFailures(Vec<LayerFailure>),
}

impl EngineError {
    pub(crate) fn config(issue: ConfigIssue, value: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            issue,
            value: value.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::IdentifierConflict { .. } => ErrorCode::IdentifierConflict,
            Self::InvalidConfiguration { issue, .. } => issue.code(),
            Self::LayerFailures(_) => ErrorCode::LayerFailures,
        }
    }
}

fn join_failures(failures: &[LayerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
