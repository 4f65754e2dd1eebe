//! CLI argument definitions using clap
//!
//! Commands:
//! - hotcold load --config <path> --workload <path>
//! - hotcold resolve --config <path> --workload <path> [--query <name>]
//! - hotcold bench --config <path> --workload <path> [--modes off,cold,hot]
//!   [--format csv|json] [--output <path>]
//! - hotcold run --config <path> --workload <path> [--format csv|json]
//!   [--output <path>]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::control::ExperimentMode;

/// hotcold - query-triggered cache warming and eviction
#[derive(Parser, Debug)]
#[command(name = "hotcold")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the workload's relations into the data directory
    Load {
        /// Path to configuration file
        #[arg(long, default_value = "./hotcold.json")]
        config: PathBuf,

        /// Path to workload file
        #[arg(long)]
        workload: PathBuf,
    },

    /// Print the objects each workload query would warm
    Resolve {
        /// Path to configuration file
        #[arg(long, default_value = "./hotcold.json")]
        config: PathBuf,

        /// Path to workload file
        #[arg(long)]
        workload: PathBuf,

        /// Only resolve this query
        #[arg(long)]
        query: Option<String>,
    },

    /// Run the workload once per mode and report hits, reads and timings
    Bench {
        /// Path to configuration file
        #[arg(long, default_value = "./hotcold.json")]
        config: PathBuf,

        /// Path to workload file
        #[arg(long)]
        workload: PathBuf,

        /// Modes to run, in order
        #[arg(
            long,
            value_delimiter = ',',
            value_parser = parse_mode,
            default_values_t = [ExperimentMode::Off, ExperimentMode::Cold, ExperimentMode::Hot]
        )]
        modes: Vec<ExperimentMode>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run the workload once in the configured experiment_mode
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./hotcold.json")]
        config: PathBuf,

        /// Path to workload file
        #[arg(long)]
        workload: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Benchmark report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

fn parse_mode(value: &str) -> Result<ExperimentMode, String> {
    ExperimentMode::parse(value)
        .ok_or_else(|| format!("invalid mode '{}': expected hot, cold or off", value))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
