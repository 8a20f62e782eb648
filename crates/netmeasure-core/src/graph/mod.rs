//! Graph construction, traversal, components, and whole-graph statistics.
//!
//! # Pipeline
//!
//! ```text
//! EdgeRow slice (one layer, or the aggregate)
//!        ↓  build::NetworkGraph::from_edgelist()
//! NetworkGraph (petgraph DiGraph + directed flag)
//!   ├─ paths::Adjacency          simple views for paths and strengths
//!   ├─ components::extract_components()
//!   │     largest weak component, largest biconnected block
//!   └─ stats::SystemMeasures::compute()
//!         one summary row per layer / aggregate
//! ```
//!
//! ## Cache Invalidation
//!
//! [`build::edgelist_hash`] is a BLAKE3 hash of the edge rows. Compare it
//! against a stored value to detect when measures need recomputing.

pub mod build;
pub mod components;
pub mod paths;
pub mod stats;

pub use build::{NetworkGraph, Tie, edgelist_hash};
pub use components::{Component, ComponentReport, extract_components};
pub use stats::SystemMeasures;
