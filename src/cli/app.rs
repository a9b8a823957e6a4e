//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{inspect, resolve};

#[derive(Parser)]
#[command(name = "dimspace")]
#[command(author, version, about = "Inspect content dimension spaces and their fallbacks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Dimension configuration file (.yaml, .yml, .toml or .json)
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "DIMSPACE_CONFIG",
        default_value = "dimensions.yaml"
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List dimensions by priority with their value trees
    Dimensions,

    /// List all allowed combinations with their weights
    Combinations,

    /// Show the ordered fallback chain of a point (e.g. language=de,region=CA)
    Fallback {
        /// Point as comma-separated dimension=value pairs
        point: String,
    },

    /// Show all specializations of a point, grouped by distance
    Specializations {
        /// Point as comma-separated dimension=value pairs
        point: String,
    },

    /// Check whether a point is within the allowed dimension subspace
    Check {
        /// Point as comma-separated dimension=value pairs
        point: String,
    },

    /// Summarize the variation graph
    Graph {
        /// Print primary generalization edges in Graphviz dot format
        #[arg(long)]
        dot: bool,
    },
}

/// Installs the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default = if verbose { "dimspace=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(cli.format, cli.verbose);

    output.verbose_ctx("config", &format!("Using configuration: {}", cli.config.display()));

    match cli.command {
        Commands::Dimensions => inspect::dimensions(&output, &cli.config)?,
        Commands::Combinations => inspect::combinations(&output, &cli.config)?,
        Commands::Graph { dot } => inspect::graph(&output, &cli.config, dot)?,
        Commands::Fallback { point } => resolve::fallback(&output, &cli.config, &point)?,
        Commands::Specializations { point } => {
            resolve::specializations(&output, &cli.config, &point)?
        }
        Commands::Check { point } => resolve::check(&output, &cli.config, &point)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
