//! Benchmark report
//!
//! One row per query per mode, with the same three measurements an
//! `EXPLAIN (ANALYZE, BUFFERS)` run yields: execution time, shared hits and
//! shared reads. Written as CSV or JSON.

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::control::ExperimentMode;
use crate::ids::DatabaseId;
use crate::observability::MetricsSnapshot;

/// Header line of the CSV output
pub const CSV_HEADER: &str = "query,mode,execution_ms,shared_hits,shared_reads";

/// Measurements for one query in one mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRow {
    pub query: String,
    pub mode: ExperimentMode,
    /// Wall time of hook plus executor
    pub execution_ms: f64,
    /// Pages the executor found cached
    pub shared_hits: u64,
    /// Pages the executor read from storage
    pub shared_reads: u64,
}

/// Totals for one mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSummary {
    pub mode: ExperimentMode,
    pub total_execution_ms: f64,
    pub shared_hits: u64,
    pub shared_reads: u64,
    /// Dataset checksum after the mode finished
    pub checksum: u32,
    /// Controller counters for this mode
    pub metrics: MetricsSnapshot,
}

/// Full result of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub database: DatabaseId,
    /// Dataset checksum before the first mode ran
    pub checksum_before: u32,
    pub rows: Vec<QueryRow>,
    pub modes: Vec<ModeSummary>,
}

impl BenchReport {
    pub fn new(database: DatabaseId, checksum_before: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            database,
            checksum_before,
            rows: Vec::new(),
            modes: Vec::new(),
        }
    }

    pub fn summary(&self, mode: ExperimentMode) -> Option<&ModeSummary> {
        self.modes.iter().find(|s| s.mode == mode)
    }

    /// Rows of one mode, in query order
    pub fn rows_for(&self, mode: ExperimentMode) -> impl Iterator<Item = &QueryRow> {
        self.rows.iter().filter(move |r| r.mode == mode)
    }

    /// True if no mode changed the stored dataset
    pub fn data_intact(&self) -> bool {
        self.modes.iter().all(|s| s.checksum == self.checksum_before)
    }

    /// Renders the rows as CSV, header included
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(64 * (self.rows.len() + 1));
        out.push_str(CSV_HEADER);
        out.push('\n');
        for row in &self.rows {
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "{},{},{:.3},{},{}",
                csv_field(&row.query),
                row.mode.as_str(),
                row.execution_ms,
                row.shared_hits,
                row.shared_reads
            );
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_csv<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_csv().as_bytes())
    }

    pub fn write_json<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
