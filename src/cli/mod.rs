//! CLI module for hotcold
//!
//! Provides command-line interface for:
//! - load: Write workload relations into the data directory
//! - resolve: Show what each workload query would warm
//! - bench: Run the workload in off, cold and hot modes
//! - run: Run the workload in the configured experiment mode

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, OutputFormat};
pub use commands::{bench, load, resolve, run, run_command, run_workload};
pub use errors::{CliError, CliErrorCode, CliResult};
