#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "netmeasure: graphs and network measures from relational records",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format (default: pretty on a TTY, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Measure a network",
        long_about = "Build the aggregate and per-layer graphs for a JSON request and compute node and system measures.",
        after_help = "EXAMPLES:\n    # Measure an edge list\n    netmeasure measure request.json\n\n    # Directed, only two metrics, machine-readable\n    netmeasure measure request.json --directed --metrics out_degree,betweenness --format json\n\n    # Keep the layers that succeeded\n    netmeasure measure request.json --partial"
    )]
    Measure(cmd::measure::MeasureArgs),

    #[command(
        about = "Show the effective engine config",
        long_about = "Print the engine config that `measure` would use, with defaults filled in, and the metric names it accepts.",
        after_help = "EXAMPLES:\n    # Show config as TOML\n    netmeasure config\n\n    # Show config from a specific file as JSON\n    netmeasure config --config engine.toml --format json"
    )]
    Config(cmd::config::ConfigArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NETMEASURE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "netmeasure=debug,info"
        } else {
            "netmeasure=info,warn"
        })
    });

    let format = env::var("NETMEASURE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let cwd = env::current_dir()?;
    match &cli.command {
        Commands::Measure(args) => cmd::measure::run_measure(args, output, &cwd),
        Commands::Config(args) => cmd::config::run_config(args, output, &cwd),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    let output = resolve_output_mode(cli.format);

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cli_error = CliError::from(&err);
            if render_error(output, &cli_error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_subcommand_parses() {
        let cli = Cli::parse_from([
            "netmeasure",
            "measure",
            "request.json",
            "--directed",
            "--metrics",
            "out_degree,betweenness",
        ]);
        let Commands::Measure(args) = cli.command else {
            panic!("expected measure");
        };
        assert!(args.directed);
        assert_eq!(args.metrics, vec!["out_degree", "betweenness"]);
        assert!(!args.partial);
    }

    #[test]
    fn format_flag_is_global() {
        let cli = Cli::parse_from(["netmeasure", "config", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn format_defaults_to_unset() {
        let cli = Cli::parse_from(["netmeasure", "measure", "r.json"]);
        assert_eq!(cli.format, None);
    }
}
