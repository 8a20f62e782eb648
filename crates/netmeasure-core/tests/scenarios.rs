//! End-to-end scenarios through the public engine API.
//!
//! Each test feeds a small hand-written network through [`measure`] and
//! checks the bundle against values worked out by hand.

use netmeasure_core::error::ConfigIssue;
use netmeasure_core::graph::{Component, NetworkGraph};
use netmeasure_core::{
    AdvisoryKind, EdgeRecord, Engine, EngineConfig, EngineError, ErrorCode, ExecutionConfig,
    MeasureError, MetricsConfig, NetworkInput, NodeId, NodeRecord, measure,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row(bundle: &netmeasure_core::Bundle, id: impl Into<NodeId>) -> usize {
    let id = id.into();
    bundle
        .node_measures
        .row_of(&id)
        .unwrap_or_else(|| panic!("no row for {id}"))
}

fn two_layer_marriage_business() -> NetworkInput {
    NetworkInput::new(
        vec![
            EdgeRecord::new("A", "B").in_layer("marriage"),
            EdgeRecord::new("A", "C").in_layer("business"),
        ],
        false,
    )
}

// ---------------------------------------------------------------------------
// Known topologies
// ---------------------------------------------------------------------------

#[test]
fn directed_triangle() {
    let input = NetworkInput::new(
        vec![EdgeRecord::new(1, 2), EdgeRecord::new(2, 3), EdgeRecord::new(3, 1)],
        true,
    );
    let bundle = measure(&input).expect("measure triangle");

    assert_eq!(bundle.graph.vertex_count(), 3);
    assert_eq!(bundle.graph.edge_count(), 3);
    assert_eq!(bundle.largest_component.len(), 3);
    assert_eq!(bundle.largest_bicomponent.vertices, vec![0, 1, 2]);
    assert_eq!(bundle.largest_bicomponent.graph.edge_count(), 3);

    let system = bundle.system_row(None).expect("system row");
    assert_eq!(system.reciprocity, Some(0.0));
    assert_eq!(system.weak_component_count, 1);
    assert_eq!(system.strong_component_count, Some(1));

    for v in 0..3 {
        assert_eq!(bundle.node_measures.integer("in_degree", v), Some(1));
        assert_eq!(bundle.node_measures.integer("out_degree", v), Some(1));
        assert_eq!(bundle.node_measures.integer("total_degree", v), Some(2));
    }
    assert!(
        bundle
            .advisories
            .iter()
            .any(|a| a.kind == AdvisoryKind::Symmetrized && a.metric.as_deref() == Some("eigenvector"))
    );
}

#[test]
fn node_table_isolate_is_kept() {
    let nodes = (1..=5).map(|id| NodeRecord::new("id", id)).collect();
    let input = NetworkInput::new(vec![EdgeRecord::new(1, 2), EdgeRecord::new(3, 4)], false)
        .with_nodes(nodes);
    let bundle = measure(&input).expect("measure");

    assert_eq!(bundle.graph.vertex_count(), 5);
    assert_eq!(bundle.node_measures.len(), 5);
    let five = row(&bundle, 5);
    assert_eq!(bundle.node_measures.integer("total_degree", five), Some(0));
    for (_, table) in bundle.node_measures_by_layer.iter() {
        assert_eq!(table.integer("total_degree", five), Some(0));
    }

    let system = bundle.system_row(None).expect("system row");
    assert_eq!(system.weak_component_count, 3);
    assert_eq!(system.isolate_count, 1);
    assert_eq!(system.largest_component_size, 2);
    // Ties go to the component found first.
    assert_eq!(bundle.largest_component.vertices, vec![0, 1]);
}

#[test]
fn two_layers_sum_into_aggregate_degree() {
    let bundle = measure(&two_layer_marriage_business()).expect("measure");

    assert_eq!(bundle.layers, vec!["marriage".to_string(), "business".to_string()]);
    assert_eq!(bundle.graph.vertex_count(), 3);
    assert_eq!(bundle.graph.edge_count(), 2);
    for column in ["total_degree", "marriage_total_degree", "business_total_degree"] {
        assert!(bundle.node_measures.has_column(column), "missing {column}");
    }

    let a = row(&bundle, "A");
    assert_eq!(bundle.node_measures.integer("total_degree", a), Some(2));
    assert_eq!(bundle.node_measures.integer("marriage_total_degree", a), Some(1));
    assert_eq!(bundle.node_measures.integer("business_total_degree", a), Some(1));

    // Every layer graph spans the whole universe.
    for (_, layer_graph) in bundle.graph_by_layer.iter() {
        assert_eq!(layer_graph.vertex_count(), 3);
        assert_eq!(layer_graph.edge_count(), 1);
    }
    assert_eq!(bundle.edgelist.len(), 2);
    assert_eq!(bundle.edgelist_by_layer.get("business").map(Vec::len), Some(1));
}

#[test]
fn shared_edge_counts_once_per_layer() {
    let input = NetworkInput::new(
        vec![
            EdgeRecord::new("A", "B").in_layer("kin"),
            EdgeRecord::new("A", "B").in_layer("work"),
        ],
        false,
    );
    let bundle = measure(&input).expect("measure");
    let a = row(&bundle, "A");
    assert_eq!(bundle.node_measures.integer("total_degree", a), Some(2));
    assert_eq!(bundle.system_row(None).map(|s| s.multi_edge_count), Some(1));
}

#[test]
fn single_layer_bundle_mirrors_its_layer() {
    let input = NetworkInput::new(
        vec![
            EdgeRecord::new("x", "y").in_layer("kin"),
            EdgeRecord::new("y", "z").in_layer("kin"),
        ],
        false,
    );
    let bundle = measure(&input).expect("measure");

    assert_eq!(bundle.layers, vec!["kin".to_string()]);
    assert_eq!(bundle.node_measures_by_layer.get("kin"), Some(&bundle.node_measures));
    assert!(bundle.node_measures.column_names().iter().all(|c| !c.starts_with("kin_")));
    assert_eq!(bundle.system_measures.len(), 1);
    assert_eq!(bundle.system_measures[0].layer.as_deref(), Some("kin"));
}

#[test]
fn weighted_undirected_adds_brokerage_columns() {
    let input = NetworkInput::new(
        vec![
            EdgeRecord::new(1, 2).weighted(2.0),
            EdgeRecord::new(1, 3),
            EdgeRecord::new(2, 3).weighted(0.5),
        ],
        false,
    );
    let bundle = measure(&input).expect("measure");
    for column in ["total_strength", "constraint", "effective_size"] {
        assert!(bundle.node_measures.has_column(column), "missing {column}");
    }
    assert!(!bundle.node_measures.has_column("in_degree"));
    let one = row(&bundle, 1);
    assert_eq!(bundle.node_measures.real("total_strength", one), Some(3.0));
}

// ---------------------------------------------------------------------------
// Round-trip and determinism
// ---------------------------------------------------------------------------

#[test]
fn edgelist_rebuilds_the_aggregate_graph() {
    let bundle = measure(&two_layer_marriage_business()).expect("measure");
    let rebuilt = netmeasure_core::graph::NetworkGraph::from_edgelist(
        bundle.graph.vertex_count(),
        &bundle.edgelist,
        bundle.directed,
    );

    let ties = |g: &netmeasure_core::graph::NetworkGraph| {
        let mut out: Vec<(usize, usize, usize, u64)> = g
            .ties()
            .map(|(s, t, tie)| (s, t, tie.dyad, tie.weight.to_bits()))
            .collect();
        out.sort_unstable();
        out
    };
    assert_eq!(rebuilt.vertex_count(), bundle.graph.vertex_count());
    assert_eq!(ties(&rebuilt), ties(&bundle.graph));
}

#[test]
fn repeated_runs_are_identical() {
    let input = two_layer_marriage_business();
    let first = serde_json::to_value(measure(&input).expect("first run")).expect("serialize");
    let second = serde_json::to_value(measure(&input).expect("second run")).expect("serialize");
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

#[test]
fn conflicting_node_rows_are_fatal() {
    let input = NetworkInput::new(vec![EdgeRecord::new(1, 2)], false).with_nodes(vec![
        NodeRecord::new("id", 1).with("group", "x"),
        NodeRecord::new("id", 1).with("group", "y"),
    ]);
    let err = measure(&input).expect_err("conflict");
    assert_eq!(
        err,
        EngineError::IdentifierConflict {
            id: "1".to_string(),
            column: "group".to_string(),
        }
    );
    assert_eq!(err.code(), ErrorCode::IdentifierConflict);
}

#[test]
fn identical_duplicate_rows_merge() {
    let input = NetworkInput::new(vec![EdgeRecord::new(1, 2)], false).with_nodes(vec![
        NodeRecord::new("id", 1).with("group", "x"),
        NodeRecord::new("id", 1).with("group", "x"),
    ]);
    let bundle = measure(&input).expect("duplicates merge");
    assert_eq!(bundle.graph.vertex_count(), 2);
}

#[test]
fn malformed_records_are_rejected_before_building() {
    let cases = [
        (
            NetworkInput::new(vec![EdgeRecord::new(1, 2).weighted(-1.0)], false),
            ConfigIssue::InvalidWeight,
        ),
        (
            NetworkInput::new(
                vec![EdgeRecord::new(1, 2).in_layer("kin"), EdgeRecord::new(2, 3)],
                false,
            ),
            ConfigIssue::MixedLayerLabels,
        ),
        (
            NetworkInput::new(vec![EdgeRecord::new(1, 2).in_layer("aggregate")], false),
            ConfigIssue::ReservedLayerLabel,
        ),
        (
            NetworkInput::new(vec![EdgeRecord::new(1, 2)], false)
                .with_nodes(vec![NodeRecord::default().with("name", "x")]),
            ConfigIssue::MissingNodeId,
        ),
    ];
    for (input, expected) in cases {
        match measure(&input) {
            Err(EngineError::InvalidConfiguration { issue, .. }) => assert_eq!(issue, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }
}

#[test]
fn zero_weight_tie_is_rejected() {
    let input = NetworkInput::new(
        vec![
            EdgeRecord::new("a", "b").weighted(0.0).in_layer("kin"),
            EdgeRecord::new("a", "c").weighted(2.0).in_layer("work"),
            EdgeRecord::new("c", "d").in_layer("work"),
        ],
        false,
    );
    let err = measure(&input).expect_err("zero-length tie");
    assert!(matches!(
        err,
        EngineError::InvalidConfiguration {
            issue: ConfigIssue::InvalidWeight,
            ..
        }
    ));
    assert_eq!(err.code(), ErrorCode::InvalidWeight);
}

#[test]
fn whole_float_attribute_matches_integer_row() {
    let json = r#"{
        "edges": [{"source": "a", "target": "b"}],
        "nodes": [{"id": "a", "age": 30}, {"id": "a", "age": 30.0}]
    }"#;
    let input: NetworkInput = serde_json::from_str(json).expect("parse request");
    let bundle = measure(&input).expect("30 and 30.0 agree");
    assert_eq!(bundle.graph.vertex_count(), 2);
}

// ---------------------------------------------------------------------------
// Layer failure isolation
// ---------------------------------------------------------------------------

/// A 6-cycle layer plus a one-edge layer hanging a pendant off the cycle.
///
/// At a Bonacich ratio of 2 the cycle's system is singular (its spectrum
/// holds both λmax = 2 and λmax / 2 = 1), while the pendant layer (±1) and
/// the aggregate (0, ±1, ±√(3 ± √2)) stay invertible.
fn ring_with_pendant() -> NetworkInput {
    let mut edges: Vec<EdgeRecord> = (1..=6)
        .map(|v| EdgeRecord::new(v, v % 6 + 1).in_layer("ring"))
        .collect();
    edges.push(EdgeRecord::new(1, 7).in_layer("tie"));
    NetworkInput::new(edges, false)
}

fn ratio_two(allow_partial: bool) -> EngineConfig {
    EngineConfig {
        metrics: MetricsConfig {
            bonacich_beta_ratio: 2.0,
            ..MetricsConfig::default()
        },
        execution: ExecutionConfig {
            parallel: true,
            allow_partial,
        },
    }
}

#[test]
fn failing_layer_alone_is_reported() {
    let err = Engine::new(ratio_two(false))
        .run(&ring_with_pendant())
        .expect_err("ring layer is singular");
    match err {
        EngineError::LayerFailures(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].layer.as_deref(), Some("ring"));
            assert!(matches!(failures[0].error, MeasureError::SingularSystem { .. }));
        }
        other => panic!("expected layer failures, got {other:?}"),
    }
}

#[test]
fn failing_layer_leaves_siblings_measured() {
    let bundle = Engine::new(ratio_two(true))
        .run(&ring_with_pendant())
        .expect("partial results allowed");

    let failed: Vec<Option<&str>> = bundle.failed_layers.iter().map(|f| f.layer.as_deref()).collect();
    assert_eq!(failed, vec![Some("ring")]);

    // The sibling layer and the aggregate keep their measures.
    for column in ["total_degree", "bonacich_power", "tie_total_degree", "tie_bonacich_power"] {
        assert!(bundle.node_measures.has_column(column), "missing {column}");
    }
    assert!(bundle.node_measures.column_names().iter().all(|c| !c.starts_with("ring_")));
    let seven = row(&bundle, 7);
    assert_eq!(bundle.node_measures.integer("tie_total_degree", seven), Some(1));
    assert_eq!(bundle.node_measures.integer("total_degree", seven), Some(1));

    let rows: Vec<Option<&str>> = bundle.system_measures.iter().map(|r| r.layer.as_deref()).collect();
    assert_eq!(rows, vec![None, Some("tie")]);
    assert!(bundle.system_row(Some("tie")).is_some_and(|r| r.edge_count == 1));

    assert!(bundle.node_measures_by_layer.get("tie").is_some());
    assert!(bundle.node_measures_by_layer.get("ring").is_none());

    // The failed layer still contributes its graph and components.
    assert_eq!(bundle.graph_by_layer.get("ring").map(NetworkGraph::edge_count), Some(6));
    assert_eq!(bundle.largest_component_by_layer.get("ring").map(Component::len), Some(6));
    assert!(
        bundle
            .advisories
            .iter()
            .any(|a| a.kind == AdvisoryKind::LayerFailed && a.layer.as_deref() == Some("ring"))
    );
}

#[test]
fn unknown_metric_request_is_fatal() {
    let engine = Engine::new(EngineConfig {
        metrics: MetricsConfig {
            requested: Some(vec!["pagerank".to_string()]),
            ..MetricsConfig::default()
        },
        ..EngineConfig::default()
    });
    let err = engine
        .run(&two_layer_marriage_business())
        .expect_err("unknown metric");
    assert_eq!(err.code(), ErrorCode::UnknownMetric);
}

#[test]
fn requested_metrics_limit_columns() {
    let engine = Engine::new(EngineConfig {
        metrics: MetricsConfig {
            requested: Some(vec!["betweenness".to_string(), "total_degree".to_string()]),
            ..MetricsConfig::default()
        },
        ..EngineConfig::default()
    });
    let bundle = engine.run(&two_layer_marriage_business()).expect("measure");
    let marriage: Vec<&str> = bundle
        .node_measures_by_layer
        .get("marriage")
        .map(|t| t.column_names())
        .unwrap_or_default();
    assert_eq!(marriage, vec!["total_degree", "betweenness"]);
}
