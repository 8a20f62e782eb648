//! Non-fatal diagnostics returned alongside results.

use std::fmt;

use serde::Serialize;

/// Category of an [`Advisory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// Computed on a symmetrized private copy of a directed graph.
    Symmetrized,
    /// Computed over reachable vertices only.
    WithinReach,
    /// Omitted because it is not defined for this graph.
    NotApplicable,
    /// An iterative method stopped before converging.
    NotConverged,
    /// The layer's computation failed and was left out.
    LayerFailed,
}

/// A metric-computation caveat. Never raised, always returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Advisory {
    /// `None` = aggregate graph.
    pub layer: Option<String>,
    pub metric: Option<String>,
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    pub fn new(layer: Option<&str>, metric: Option<&str>, kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            layer: layer.map(str::to_string),
            metric: metric.map(str::to_string),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(layer) = &self.layer {
            write!(f, "[{layer}] ")?;
        }
        f.write_str(&self.message)
    }
}
