//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::bench::{BenchError, WorkloadError};
use crate::buffer::BufferError;
use crate::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Workload file error
    WorkloadError,
    /// Workload relations missing from the data directory
    NotLoaded,
    /// Requested query not in the workload
    QueryNotFound,
    /// Benchmark run failed or corrupted data
    BenchFailed,
    /// I/O error (files, stdout)
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "HC_CLI_CONFIG_ERROR",
            Self::WorkloadError => "HC_CLI_WORKLOAD_ERROR",
            Self::NotLoaded => "HC_CLI_NOT_LOADED",
            Self::QueryNotFound => "HC_CLI_QUERY_NOT_FOUND",
            Self::BenchFailed => "HC_CLI_BENCH_FAILED",
            Self::IoError => "HC_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Workload error
    pub fn workload_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::WorkloadError, msg)
    }

    /// Relation missing from the data directory
    pub fn not_loaded(relation: impl fmt::Display) -> Self {
        Self::new(
            CliErrorCode::NotLoaded,
            format!(
                "Relation {} is not in the data directory. Run 'hotcold load' first.",
                relation
            ),
        )
    }

    /// Unknown query name
    pub fn query_not_found(name: &str) -> Self {
        Self::new(
            CliErrorCode::QueryNotFound,
            format!("Query '{}' is not in the workload", name),
        )
    }

    /// Benchmark failed
    pub fn bench_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BenchFailed, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<WorkloadError> for CliError {
    fn from(e: WorkloadError) -> Self {
        Self::workload_error(e.to_string())
    }
}

impl From<BenchError> for CliError {
    fn from(e: BenchError) -> Self {
        match e {
            BenchError::Workload(e) => e.into(),
            other => Self::bench_failed(other.to_string()),
        }
    }
}

impl From<BufferError> for CliError {
    fn from(e: BufferError) -> Self {
        Self::io_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
