//! `netmeasure measure`: run the engine on a JSON request file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use netmeasure_core::graph::SystemMeasures;
use netmeasure_core::{Bundle, ColumnData, Engine, EngineConfig, NetworkInput, load_engine_config};
use tracing::{debug, info};

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// JSON file holding `edges`, and optionally `nodes`, `directed`,
    /// `node_id_column` and `network_name`.
    pub request: PathBuf,

    /// Treat the network as directed, whatever the request says.
    #[arg(long)]
    pub directed: bool,

    /// Engine config file (default: ./netmeasure.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only compute these metric columns (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub metrics: Vec<String>,

    /// Keep the layers that succeeded when others fail.
    #[arg(long)]
    pub partial: bool,

    /// Run layers one after another instead of on the thread pool.
    #[arg(long)]
    pub serial: bool,

    /// In text mode, also print the node measure table.
    #[arg(long)]
    pub nodes: bool,
}

/// Read the request file.
pub fn load_request(path: &Path) -> Result<NetworkInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Fold the command-line overrides into the loaded config.
fn apply_overrides(mut config: EngineConfig, args: &MeasureArgs) -> EngineConfig {
    if !args.metrics.is_empty() {
        config.metrics.requested = Some(args.metrics.clone());
    }
    if args.partial {
        config.execution.allow_partial = true;
    }
    if args.serial {
        config.execution.parallel = false;
    }
    config
}

pub fn run_measure(args: &MeasureArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let config_path = super::config_path(args.config.as_deref(), cwd);
    let config = apply_overrides(load_engine_config(&config_path)?, args);
    debug!(path = %config_path.display(), ?config, "engine config");

    let mut input = load_request(&args.request)?;
    if args.directed {
        input.directed = true;
    }
    info!(request = %args.request.display(), edges = input.edges.len(), "measuring");

    let bundle = Engine::new(config).run(&input)?;
    let show_nodes = args.nodes;
    render_mode(
        output,
        &bundle,
        |b, w| render_text(b, show_nodes, w),
        render_pretty,
    )
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

fn layer_label(row: &SystemMeasures) -> &str {
    row.layer.as_deref().unwrap_or("aggregate")
}

fn render_text(bundle: &Bundle, show_nodes: bool, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "layer\tnodes\tedges\tdensity\treciprocity\ttransitivity\tdiameter\tcomponents\tlargest\tbicomponent"
    )?;
    for row in &bundle.system_measures {
        writeln!(
            w,
            "{}\t{}\t{}\t{:.4}\t{}\t{}\t{}\t{}\t{}\t{}",
            layer_label(row),
            row.node_count,
            row.edge_count,
            row.density,
            fmt_opt(row.reciprocity),
            fmt_opt(row.transitivity),
            fmt_opt(row.diameter),
            row.weak_component_count,
            row.largest_component_size,
            row.largest_bicomponent_size,
        )?;
    }

    if show_nodes {
        let table = &bundle.node_measures;
        writeln!(w)?;
        let names = table.column_names();
        writeln!(w, "id\t{}", names.join("\t"))?;
        for (row, id) in table.ids.iter().enumerate() {
            let cells: Vec<String> = table
                .columns
                .iter()
                .map(|column| match &column.values {
                    ColumnData::Integer(values) => values[row].to_string(),
                    ColumnData::Real(values) => fmt_opt(values[row]),
                })
                .collect();
            writeln!(w, "{id}\t{}", cells.join("\t"))?;
        }
    }

    for message in bundle.advisory_messages() {
        writeln!(w, "advisory\t{message}")?;
    }
    for failure in &bundle.failed_layers {
        writeln!(w, "failed\t{failure}")?;
    }
    Ok(())
}

fn render_pretty(bundle: &Bundle, w: &mut dyn Write) -> io::Result<()> {
    let title = bundle.network_name.as_deref().unwrap_or("network");
    pretty_section(w, &format!("{title} ({} layer(s))", bundle.layers.len()))?;
    pretty_kv(w, "directed", bundle.directed.to_string())?;
    pretty_kv(w, "vertices", bundle.graph.vertex_count().to_string())?;
    pretty_kv(w, "edges", bundle.graph.edge_count().to_string())?;
    pretty_kv(w, "layers", bundle.layers.join(", "))?;
    pretty_kv(w, "edge list hash", &bundle.edgelist_hash)?;
    pretty_kv(w, "node measures", bundle.node_measures.column_names().join(", "))?;

    for row in &bundle.system_measures {
        writeln!(w)?;
        pretty_section(w, layer_label(row))?;
        pretty_kv(w, "density", format!("{:.4}", row.density))?;
        pretty_kv(w, "reciprocity", fmt_opt(row.reciprocity))?;
        pretty_kv(w, "transitivity", fmt_opt(row.transitivity))?;
        let diameter = if row.diameter_restricted {
            format!("{} (largest component)", fmt_opt(row.diameter))
        } else {
            fmt_opt(row.diameter)
        };
        pretty_kv(w, "diameter", diameter)?;
        pretty_kv(w, "average path length", fmt_opt(row.average_path_length))?;
        pretty_kv(w, "mean degree", format!("{:.4}", row.mean_degree))?;
        pretty_kv(w, "isolates", row.isolate_count.to_string())?;
        pretty_kv(
            w,
            "components",
            format!("{} (largest {})", row.weak_component_count, row.largest_component_size),
        )?;
        pretty_kv(
            w,
            "bicomponents",
            format!("{} (largest {})", row.bicomponent_count, row.largest_bicomponent_size),
        )?;
    }

    if !bundle.advisories.is_empty() || !bundle.failed_layers.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Advisories")?;
        for message in bundle.advisory_messages() {
            writeln!(w, "  ! {message}")?;
        }
        for failure in &bundle.failed_layers {
            writeln!(w, "  x {failure}")?;
        }
    }
    pretty_rule(w)
}
