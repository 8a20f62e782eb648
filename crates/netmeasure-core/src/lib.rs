#![forbid(unsafe_code)]
//! netmeasure-core library.
//!
//! Relational records in, canonical graphs and structural network measures
//! out. [`Engine::run`] takes a [`NetworkInput`] (edge list, optional node
//! table, optional layer labels) and returns a [`Bundle`] holding the edge
//! list, node and system measure tables, aggregate and per-layer graphs,
//! the largest connected and biconnected components, and any advisories.
//!
//! # Conventions
//!
//! - **Errors**: typed [`EngineError`] / [`MeasureError`] in the engine,
//!   `anyhow::Result` for config loading.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`); install a
//!   subscriber in the binary.
//!
//! ```rust
//! use netmeasure_core::{EdgeRecord, NetworkInput, measure};
//!
//! let input = NetworkInput::new(
//!     vec![EdgeRecord::new(1, 2), EdgeRecord::new(2, 3), EdgeRecord::new(3, 1)],
//!     true,
//! );
//! let bundle = measure(&input).expect("valid input");
//! assert_eq!(bundle.graph.edge_count(), 3);
//! assert_eq!(bundle.system_measures[0].reciprocity, Some(0.0));
//! ```

pub mod advisory;
pub mod bundle;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod layers;
pub mod metrics;
pub mod model;
pub mod reconcile;

pub use advisory::{Advisory, AdvisoryKind};
pub use bundle::Bundle;
pub use config::{EngineConfig, ExecutionConfig, MetricsConfig, load_engine_config};
pub use engine::{Engine, measure};
pub use error::{EngineError, ErrorCode, LayerFailure, MeasureError};
pub use layers::{EdgeRow, LayerMap};
pub use metrics::{ColumnData, MetricKind, NodeMeasureTable};
pub use model::{AttrValue, EdgeRecord, NetworkInput, NodeId, NodeRecord};
