//! Engine entry point.
//!
//! One invocation runs the whole pipeline to completion:
//!
//! ```text
//! NetworkInput
//!   ↓ MetricPlan::resolve     (fatal: unknown / directed-only metric)
//!   ↓ reconcile               (fatal: identifier conflict, bad node ids)
//!   ↓ plan_layers             (fatal: bad weights, malformed labels)
//!   ↓ per scope, in parallel: graph → components → node measures → summary
//!   ↓ assemble
//! Bundle
//! ```
//!
//! Scopes share only read-only data (edge rows, identifiers, config), so the
//! per-scope pass runs on the rayon pool and joins before assembly. A scope
//! whose measures fail does not stop its siblings; the failures are either
//! raised together or, with `execution.allow_partial`, recorded in the
//! bundle.

use std::time::Instant;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument, warn};

use crate::bundle::{Bundle, assemble};
use crate::config::{EngineConfig, MetricsConfig};
use crate::error::{EngineError, LayerFailure, MeasureError};
use crate::graph::{ComponentReport, NetworkGraph, SystemMeasures, extract_components};
use crate::layers::{LayerPlan, Scope, plan_layers};
use crate::metrics::{MetricPlan, NodeMeasures, compute_node_measures};
use crate::model::{NetworkInput, NodeId};
use crate::reconcile::reconcile;

/// Everything computed for one scope.
#[derive(Debug, Clone)]
pub(crate) struct ScopeOutcome {
    pub scope: Scope,
    pub graph: NetworkGraph,
    pub components: ComponentReport,
    pub analysis: Result<ScopeAnalysis, MeasureError>,
}

/// The fallible part of a scope's results.
#[derive(Debug, Clone)]
pub(crate) struct ScopeAnalysis {
    pub nodes: NodeMeasures,
    pub system: SystemMeasures,
}

impl ScopeOutcome {
    pub fn failure(&self) -> Option<LayerFailure> {
        self.analysis.as_ref().err().map(|error| LayerFailure {
            layer: self.scope.layer().map(str::to_string),
            error: error.clone(),
        })
    }
}

/// Read-only inputs shared by every scope worker.
struct ScopeContext<'a> {
    layers: &'a LayerPlan,
    ids: &'a [NodeId],
    directed: bool,
    metrics: &'a MetricsConfig,
    plan: &'a MetricPlan,
}

impl ScopeContext<'_> {
    #[instrument(skip_all, fields(scope = scope.layer().unwrap_or("aggregate")))]
    fn analyse(&self, scope: &Scope) -> ScopeOutcome {
        let graph = NetworkGraph::from_edgelist(self.ids.len(), self.layers.edges_for(scope), self.directed);
        let components = extract_components(&graph);

        let analysis = compute_node_measures(&graph, self.ids, self.metrics, self.plan, scope.layer())
            .map(|nodes| {
                let system = SystemMeasures::compute(scope.layer(), &graph, &nodes.table, &components);
                ScopeAnalysis { nodes, system }
            });

        if let Err(error) = &analysis {
            warn!(%error, "scope measures failed");
        }
        ScopeOutcome {
            scope: scope.clone(),
            graph,
            components,
            analysis,
        }
    }
}

/// The measurement engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline on `input`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidConfiguration`] for a bad metric request,
    ///   node identifier, weight or layer label. Raised before any graph
    ///   is built.
    /// - [`EngineError::IdentifierConflict`] when one identifier has two
    ///   different attribute rows.
    /// - [`EngineError::LayerFailures`] when some scope's measures failed
    ///   and `execution.allow_partial` is off. Raised after every scope ran.
    #[instrument(skip_all, fields(edges = input.edges.len(), directed = input.directed))]
    pub fn run(&self, input: &NetworkInput) -> Result<Bundle, EngineError> {
        let start = Instant::now();

        let plan = MetricPlan::resolve(self.config.metrics.requested.as_deref(), input.directed)?;
        let reconciled = reconcile(input)?;
        let layers = plan_layers(input, &reconciled)?;
        debug!(
            vertices = reconciled.universe.len(),
            layers = layers.layers.len(),
            metrics = plan.kinds.len(),
            "inputs validated"
        );

        let ctx = ScopeContext {
            layers: &layers,
            ids: reconciled.universe.ids(),
            directed: input.directed,
            metrics: &self.config.metrics,
            plan: &plan,
        };
        let aggregate_scope = layers.aggregate_scope();
        let layer_scopes = layers.layer_scopes();

        let (aggregate, per_layer) = if self.config.execution.parallel {
            rayon::join(
                || ctx.analyse(&aggregate_scope),
                || layer_scopes.par_iter().map(|s| ctx.analyse(s)).collect::<Vec<_>>(),
            )
        } else {
            (
                ctx.analyse(&aggregate_scope),
                layer_scopes.iter().map(|s| ctx.analyse(s)).collect(),
            )
        };

        let failures: Vec<LayerFailure> = std::iter::once(&aggregate)
            .chain(&per_layer)
            .filter_map(ScopeOutcome::failure)
            .collect();
        if !failures.is_empty() && !self.config.execution.allow_partial {
            warn!(failed = failures.len(), "aborting: layer failures without partial results");
            return Err(EngineError::LayerFailures(failures));
        }

        let bundle = assemble(input, reconciled, layers, aggregate, per_layer);
        info!(
            vertices = bundle.node_measures.len(),
            layers = bundle.layers.len(),
            advisories = bundle.advisories.len(),
            failed = bundle.failed_layers.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "measurement complete"
        );
        Ok(bundle)
    }
}

/// Run the engine with the default configuration.
///
/// # Errors
///
/// See [`Engine::run`].
pub fn measure(input: &NetworkInput) -> Result<Bundle, EngineError> {
    Engine::default().run(input)
}
