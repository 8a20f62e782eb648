//! Node-level measure battery.
//!
//! # Overview
//!
//! Which metrics a graph gets is decided once, up front, by a declarative
//! applicability table keyed on the graph's [`GraphProfile`]
//! (`directed`, `weighted`, `connected`). Every metric then runs
//! unconditionally on the graphs the table admits.
//!
//! | column | undirected | directed | needs weights | disconnected |
//! |---|---|---|---|---|
//! | `total_degree` | yes | yes | | |
//! | `in_degree`, `out_degree` | | yes | | |
//! | `total_strength` | yes | yes | yes | |
//! | `in_strength`, `out_strength` | | yes | yes | |
//! | `betweenness`, `reach` | yes | yes | | |
//! | `closeness` | yes | yes | | within reach (advisory) |
//! | `eigenvector`, `bonacich_power`, `local_transitivity` | yes | symmetrized (advisory) | | |
//! | `constraint`, `effective_size` | yes | | yes | |
//!
//! # Usage
//!
//! ```rust,ignore
//! use netmeasure_core::metrics::{MetricPlan, compute_node_measures};
//!
//! let plan = MetricPlan::resolve(config.metrics.requested.as_deref(), directed)?;
//! let measures = compute_node_measures(&graph, &ids, &config.metrics, &plan, None)?;
//! for advisory in &measures.advisories {
//!     eprintln!("{advisory}");
//! }
//! ```

pub mod betweenness;
pub mod bonacich;
pub mod brokerage;
pub mod closeness;
pub mod degree;
pub mod eigenvector;
pub mod table;
pub mod transitivity;

use tracing::{debug, instrument, warn};

pub use table::{Column, ColumnData, NodeMeasureTable};

use crate::advisory::{Advisory, AdvisoryKind};
use crate::config::MetricsConfig;
use crate::error::{ConfigIssue, EngineError, MeasureError};
use crate::graph::NetworkGraph;
use crate::graph::components::{strong_component_count, weak_components};
use crate::graph::paths::Adjacency;
use crate::model::NodeId;

// ---------------------------------------------------------------------------
// MetricKind
// ---------------------------------------------------------------------------

/// One node-level measure column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    TotalDegree,
    InDegree,
    OutDegree,
    TotalStrength,
    InStrength,
    OutStrength,
    Betweenness,
    Closeness,
    Reach,
    Eigenvector,
    BonacichPower,
    LocalTransitivity,
    Constraint,
    EffectiveSize,
}

impl MetricKind {
    /// Every metric in column order.
    pub const ALL: [Self; 14] = [
        Self::TotalDegree,
        Self::InDegree,
        Self::OutDegree,
        Self::TotalStrength,
        Self::InStrength,
        Self::OutStrength,
        Self::Betweenness,
        Self::Closeness,
        Self::Reach,
        Self::Eigenvector,
        Self::BonacichPower,
        Self::LocalTransitivity,
        Self::Constraint,
        Self::EffectiveSize,
    ];

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::TotalDegree => "total_degree",
            Self::InDegree => "in_degree",
            Self::OutDegree => "out_degree",
            Self::TotalStrength => "total_strength",
            Self::InStrength => "in_strength",
            Self::OutStrength => "out_strength",
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
            Self::Reach => "reach",
            Self::Eigenvector => "eigenvector",
            Self::BonacichPower => "bonacich_power",
            Self::LocalTransitivity => "local_transitivity",
            Self::Constraint => "constraint",
            Self::EffectiveSize => "effective_size",
        }
    }

    #[must_use]
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.column() == name)
    }

    /// Only defined when the network is directed.
    #[must_use]
    pub const fn directed_only(self) -> bool {
        matches!(
            self,
            Self::InDegree | Self::OutDegree | Self::InStrength | Self::OutStrength
        )
    }

    const fn needs_paths(self) -> bool {
        matches!(self, Self::Betweenness | Self::Closeness | Self::Reach)
    }
}

// ---------------------------------------------------------------------------
// Applicability
// ---------------------------------------------------------------------------

/// The three graph properties metric applicability depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphProfile {
    pub directed: bool,
    pub weighted: bool,
    /// Every vertex reaches every other (strongly, when directed).
    pub connected: bool,
}

impl GraphProfile {
    #[must_use]
    pub fn of(g: &NetworkGraph) -> Self {
        let connected = if g.directed() {
            strong_component_count(g).unwrap_or(0) <= 1
        } else {
            weak_components(g).len() <= 1
        };
        Self {
            directed: g.directed(),
            weighted: g.weighted(),
            connected,
        }
    }
}

/// How a metric is computed for a given [`GraphProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Compute,
    /// On an undirected private copy of a directed graph.
    ComputeSymmetrized,
    /// Over reachable vertex pairs only.
    ComputeWithinReach,
    Omit,
}

/// The applicability table.
#[must_use]
pub const fn eligibility(kind: MetricKind, profile: GraphProfile) -> Eligibility {
    use Eligibility::{Compute, ComputeSymmetrized, ComputeWithinReach, Omit};
    use MetricKind::{
        Betweenness, BonacichPower, Closeness, Constraint, EffectiveSize, Eigenvector, InDegree,
        InStrength, LocalTransitivity, OutDegree, OutStrength, Reach, TotalDegree, TotalStrength,
    };

    let GraphProfile {
        directed,
        weighted,
        connected,
    } = profile;

    match (kind, directed, weighted, connected) {
        (TotalDegree | Betweenness | Reach, ..)
        | (InDegree | OutDegree, true, _, _)
        | (TotalStrength, _, true, _)
        | (InStrength | OutStrength, true, true, _)
        | (Closeness, _, _, true)
        | (Eigenvector | BonacichPower | LocalTransitivity, false, _, _)
        | (Constraint | EffectiveSize, false, true, _) => Compute,
        (Closeness, _, _, false) => ComputeWithinReach,
        (Eigenvector | BonacichPower | LocalTransitivity, true, _, _) => ComputeSymmetrized,
        (InDegree | OutDegree | TotalStrength | InStrength | OutStrength, ..)
        | (Constraint | EffectiveSize, ..) => Omit,
    }
}

/// Every metric paired with its eligibility for `profile`, in column order.
#[must_use]
pub fn applicability(profile: GraphProfile) -> Vec<(MetricKind, Eligibility)> {
    MetricKind::ALL
        .into_iter()
        .map(|kind| (kind, eligibility(kind, profile)))
        .collect()
}

// ---------------------------------------------------------------------------
// MetricPlan
// ---------------------------------------------------------------------------

/// The metrics an invocation asks for, resolved before any graph is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricPlan {
    /// Requested metrics in column order.
    pub kinds: Vec<MetricKind>,
    /// `true` when the caller named the metrics; omissions then get advisories.
    pub explicit: bool,
}

impl Default for MetricPlan {
    fn default() -> Self {
        Self {
            kinds: MetricKind::ALL.to_vec(),
            explicit: false,
        }
    }
}

impl MetricPlan {
    /// Resolve requested column names against the battery.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfiguration`] for an unknown name, or for a
    /// directed-only metric requested on an undirected network.
    pub fn resolve(requested: Option<&[String]>, directed: bool) -> Result<Self, EngineError> {
        let Some(names) = requested else {
            return Ok(Self::default());
        };

        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let kind = MetricKind::from_column(name.trim())
                .ok_or_else(|| EngineError::config(ConfigIssue::UnknownMetric, name.clone()))?;
            if kind.directed_only() && !directed {
                return Err(EngineError::config(ConfigIssue::DirectedOnlyMetric, name.clone()));
            }
            kinds.push(kind);
        }
        kinds.sort_unstable();
        kinds.dedup();

        Ok(Self {
            kinds,
            explicit: true,
        })
    }

    fn wants_paths(&self) -> bool {
        self.kinds.iter().any(|kind| kind.needs_paths())
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// A graph's node measure table plus the caveats attached while building it.
#[derive(Debug, Clone)]
pub struct NodeMeasures {
    pub table: NodeMeasureTable,
    pub advisories: Vec<Advisory>,
}

/// Fail on the first NaN or infinite cell.
fn finite(
    kind: MetricKind,
    values: Vec<Option<f64>>,
    ids: &[NodeId],
) -> Result<ColumnData, MeasureError> {
    if let Some(v) = values.iter().position(|x| x.is_some_and(|x| !x.is_finite())) {
        return Err(MeasureError::NonFiniteScore {
            metric: kind.column(),
            vertex: ids.get(v).map_or_else(|| v.to_string(), ToString::to_string),
        });
    }
    Ok(ColumnData::Real(values))
}

fn dense(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}

/// Compute the node measure table for one graph.
///
/// `ids` are the external identifiers of `g`'s vertices in local order.
/// `layer` tags advisories (`None` = aggregate).
///
/// # Errors
///
/// [`MeasureError`] when a metric cannot be computed numerically. The caller
/// isolates the failure to this graph.
#[instrument(skip_all, fields(layer = layer.unwrap_or("aggregate"), vertices = g.vertex_count()))]
pub fn compute_node_measures(
    g: &NetworkGraph,
    ids: &[NodeId],
    config: &MetricsConfig,
    plan: &MetricPlan,
    layer: Option<&str>,
) -> Result<NodeMeasures, MeasureError> {
    let profile = GraphProfile::of(g);
    debug!(?profile, "node measure profile");

    let mut table = NodeMeasureTable::new(ids.to_vec());
    let mut advisories = Vec::new();

    let degrees = degree::degrees(g);
    let paths = plan.wants_paths().then(|| Adjacency::for_paths(g));
    let strengths = Adjacency::strengths(g);
    let reach = paths.as_ref().map(closeness::closeness_and_reach);
    let holes = (profile.weighted && !profile.directed).then(|| brokerage::brokerage(&strengths));

    for &kind in &plan.kinds {
        let name = kind.column();
        match eligibility(kind, profile) {
            Eligibility::Omit => {
                if plan.explicit {
                    advisories.push(Advisory::new(
                        layer,
                        Some(name),
                        AdvisoryKind::NotApplicable,
                        format!("{name} omitted: not defined for this graph"),
                    ));
                }
                continue;
            }
            Eligibility::ComputeSymmetrized => advisories.push(Advisory::new(
                layer,
                Some(name),
                AdvisoryKind::Symmetrized,
                format!("{name} computed on symmetrized graph"),
            )),
            Eligibility::ComputeWithinReach => advisories.push(Advisory::new(
                layer,
                Some(name),
                AdvisoryKind::WithinReach,
                format!("{name} computed over reachable vertices only (graph is disconnected)"),
            )),
            Eligibility::Compute => {}
        }

        let values = match kind {
            MetricKind::TotalDegree => ColumnData::Integer(degrees.total_degree.clone()),
            MetricKind::InDegree => ColumnData::Integer(degrees.in_degree.clone()),
            MetricKind::OutDegree => ColumnData::Integer(degrees.out_degree.clone()),
            MetricKind::TotalStrength => finite(kind, dense(degrees.total_strength.clone()), ids)?,
            MetricKind::InStrength => finite(kind, dense(degrees.in_strength.clone()), ids)?,
            MetricKind::OutStrength => finite(kind, dense(degrees.out_strength.clone()), ids)?,
            MetricKind::Betweenness => {
                let scores = paths
                    .as_ref()
                    .map(|adj| betweenness::betweenness_centrality(adj, profile.directed))
                    .unwrap_or_default();
                finite(kind, dense(scores), ids)?
            }
            MetricKind::Closeness => finite(
                kind,
                reach.as_ref().map(|r| r.closeness.clone()).unwrap_or_default(),
                ids,
            )?,
            MetricKind::Reach => {
                ColumnData::Integer(reach.as_ref().map(|r| r.reach.clone()).unwrap_or_default())
            }
            MetricKind::Eigenvector => {
                let result = eigenvector::eigenvector_centrality(
                    &strengths,
                    config.eigenvector_max_iter,
                    config.eigenvector_tolerance,
                );
                if !result.converged {
                    warn!(iterations = result.iterations, "eigenvector did not converge");
                    advisories.push(Advisory::new(
                        layer,
                        Some(name),
                        AdvisoryKind::NotConverged,
                        format!(
                            "{name} did not converge within {} iterations",
                            result.iterations
                        ),
                    ));
                }
                finite(kind, dense(result.scores), ids)?
            }
            MetricKind::BonacichPower => finite(
                kind,
                dense(bonacich::bonacich_power(&strengths, config.bonacich_beta_ratio)?),
                ids,
            )?,
            MetricKind::LocalTransitivity => finite(
                kind,
                transitivity::local_transitivity(&Adjacency::undirected(g)),
                ids,
            )?,
            MetricKind::Constraint => finite(
                kind,
                holes.as_ref().map(|b| b.constraint.clone()).unwrap_or_default(),
                ids,
            )?,
            MetricKind::EffectiveSize => finite(
                kind,
                holes.as_ref().map(|b| b.effective_size.clone()).unwrap_or_default(),
                ids,
            )?,
        };
        table.push(name, values);
    }

    debug!(columns = table.columns.len(), "node measures computed");
    Ok(NodeMeasures { table, advisories })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
