//! `netmeasure config`: print the effective engine configuration.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use netmeasure_core::{EngineConfig, MetricKind, load_engine_config};
use serde::Serialize;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Engine config file (default: ./netmeasure.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    path: String,
    config: EngineConfig,
    /// Names accepted by `metrics.requested`.
    metrics: Vec<&'static str>,
}

fn metric_names() -> Vec<&'static str> {
    MetricKind::ALL.iter().map(|kind| kind.column()).collect()
}

pub fn run_config(args: &ConfigArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let path = super::config_path(args.config.as_deref(), cwd);
    let config = load_engine_config(&path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if output.is_json() {
        let effective = EffectiveConfig {
            path: path.display().to_string(),
            config,
            metrics: metric_names(),
        };
        serde_json::to_writer_pretty(&mut out, &effective)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "# {}", path.display())?;
    write!(out, "{}", config.to_toml()?)?;
    writeln!(out)?;
    writeln!(out, "# metrics: {}", metric_names().join(", "))?;
    Ok(())
}
