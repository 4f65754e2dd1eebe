//! Static configuration file
//!
//! JSON, loaded once at start-up. Everything except `data_dir` has a default.
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/hotcold",
//!   "experiment_mode": "cold",
//!   "index_scan_target": "base_table",
//!   "trigger_point": "pre_execution",
//!   "shared_buffers": 16384,
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::{ExperimentMode, TriggerPoint};
use crate::observability::{log_event, Event, Severity};
use crate::plan::IndexScanTarget;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory holding `base/<db>/<object>` page files (required)
    pub data_dir: String,

    /// Mode the session starts in; `hotcold run` runs the workload in it
    #[serde(default)]
    pub experiment_mode: ExperimentMode,

    /// Object an index-driven scan warms
    #[serde(default)]
    pub index_scan_target: IndexScanTarget,

    /// Lifecycle point where the hook fires
    #[serde(default)]
    pub trigger_point: TriggerPoint,

    /// Shared buffer pool size in pages (default 16384, 128MB)
    #[serde(default = "default_shared_buffers")]
    pub shared_buffers: usize,

    /// Lowest log severity written (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_shared_buffers() -> usize {
    16384
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Configuration with every default and the given data directory
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            experiment_mode: ExperimentMode::default(),
            index_scan_target: IndexScanTarget::default(),
            trigger_point: TriggerPoint::default(),
            shared_buffers: default_shared_buffers(),
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&content)?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("data_dir", &config.data_dir),
                ("experiment_mode", config.experiment_mode.as_str()),
                ("index_scan_target", config.index_scan_target.as_str()),
                ("trigger_point", config.trigger_point.as_str()),
            ],
        );

        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".to_string()));
        }

        if self.shared_buffers == 0 {
            return Err(ConfigError::Invalid("shared_buffers must be > 0".to_string()));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Parsed `log_level`; validation guarantees it parses
    pub fn log_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}
