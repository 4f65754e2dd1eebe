//! CLI command implementations
//!
//! Every command starts the same way: load the configuration, apply its log
//! level, open the page store under `data_dir`, then read the workload.
//! `run` is `bench` with a single mode taken from the configuration.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::bench::{BenchRunner, Workload};
use crate::buffer::{FilePageStore, PageStore};
use crate::config::Config;
use crate::control::ExperimentMode;
use crate::observability::Logger;
use crate::plan::PlanTreeWalker;

use super::args::{Command, OutputFormat};
use super::errors::{CliError, CliResult};
use super::io::{write_output, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Load { config, workload } => load(&config, &workload),
        Command::Resolve {
            config,
            workload,
            query,
        } => resolve(&config, &workload, query.as_deref()),
        Command::Bench {
            config,
            workload,
            modes,
            format,
            output,
        } => bench(&config, &workload, &modes, format, output.as_deref()),
        Command::Run {
            config,
            workload,
            format,
            output,
        } => run_workload(&config, &workload, format, output.as_deref()),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity());
    Ok(config)
}

/// Write the workload's relations under `<data_dir>/base`
pub fn load(config_path: &Path, workload_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let workload = Workload::from_file(workload_path)?;
    let store = FilePageStore::open(config.data_path())?;

    let pages = workload.load(&store)?;
    let checksum = workload.checksum(&store)?;

    write_response(json!({
        "loaded": true,
        "database": workload.database,
        "relations": workload.relations.len(),
        "pages": pages,
        "checksum": format!("{:08x}", checksum),
    }))
}

/// Print resolved warming targets and scan references per query
pub fn resolve(config_path: &Path, workload_path: &Path, query: Option<&str>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let workload = Workload::from_file(workload_path)?;
    let walker = PlanTreeWalker::new(config.index_scan_target);

    let queries = match query {
        Some(name) => vec![workload
            .query(name)
            .ok_or_else(|| CliError::query_not_found(name))?],
        None => workload.queries.iter().collect(),
    };

    let mut resolved = Vec::with_capacity(queries.len());
    for query in queries {
        // Validation already resolved every plan once
        let objects = walker
            .resolve(query.plan.as_ref(), &query.range_table)
            .map_err(|e| CliError::workload_error(format!("query '{}': {}", query.name, e)))?;
        let scans = query.scans()?;

        resolved.push(json!({
            "query": query.name,
            "objects": objects,
            "scans": scans,
        }));
    }

    write_response(json!({
        "database": workload.database,
        "index_scan_target": config.index_scan_target.as_str(),
        "queries": Value::Array(resolved),
    }))
}

/// Run the benchmark and write the report
pub fn bench(
    config_path: &Path,
    workload_path: &Path,
    modes: &[ExperimentMode],
    format: OutputFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    run_modes(&config, workload_path, modes, format, output)
}

/// Run the workload once, in the mode the configuration starts with
pub fn run_workload(
    config_path: &Path,
    workload_path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    run_modes(&config, workload_path, &[config.experiment_mode], format, output)
}

fn run_modes(
    config: &Config,
    workload_path: &Path,
    modes: &[ExperimentMode],
    format: OutputFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let workload = Workload::from_file(workload_path)?;
    let store = Arc::new(FilePageStore::open(config.data_path())?);

    for relation in &workload.relations {
        if !store.relation_exists(workload.database, relation.object) {
            return Err(CliError::not_loaded(relation.object));
        }
    }

    let runner = BenchRunner::new(store, config.shared_buffers)
        .with_index_target(config.index_scan_target)
        .with_trigger_point(config.trigger_point);
    let report = runner.run(&workload, modes)?;

    write_output(output, |w| match format {
        OutputFormat::Csv => report.write_csv(w),
        OutputFormat::Json => report.write_json(w),
    })?;

    if !report.data_intact() {
        return Err(CliError::bench_failed(format!(
            "dataset checksum changed during run {}",
            report.run_id
        )));
    }

    Ok(())
}
