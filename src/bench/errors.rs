//! Benchmark errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::buffer::BufferError;

/// Workload file errors
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to read workload {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid workload JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid workload: {0}")]
    Invalid(String),

    #[error("failed to load workload: {0}")]
    Store(#[from] BufferError),
}

/// Result type for workload operations
pub type WorkloadResult<T> = Result<T, WorkloadError>;

/// Benchmark run errors
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    #[error("query {query} failed in {mode} mode: {source}")]
    Query {
        query: String,
        mode: &'static str,
        #[source]
        source: BufferError,
    },

    #[error("dataset checksum failed: {0}")]
    Checksum(#[source] BufferError),

    #[error("no modes requested")]
    NoModes,
}

/// Result type for benchmark runs
pub type BenchResult<T> = Result<T, BenchError>;
