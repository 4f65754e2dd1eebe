//! Runtime settings
//!
//! One setting, `experiment_mode`, with values `hot`, `cold` and `off`,
//! default `cold`. Only a superuser may change it. Reads are plain atomic
//! loads: a change is seen by the next triggering query, never by one
//! already in flight.

use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

use super::mode::ExperimentMode;
use crate::observability::{log_event, Event};

/// Name of the mode setting
pub const EXPERIMENT_MODE: &str = "experiment_mode";

/// Caller's privilege when changing a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    User,
    Superuser,
}

/// Setting errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("unrecognized configuration parameter \"{0}\"")]
    UnknownSetting(String),

    #[error("invalid value for parameter \"{name}\": \"{value}\" (allowed: hot, cold, off)")]
    InvalidValue { name: String, value: String },

    #[error("permission denied to set parameter \"{0}\"")]
    PermissionDenied(String),
}

/// Result type for setting operations
pub type SettingResult<T> = Result<T, SettingError>;

/// Process-wide runtime settings
#[derive(Debug)]
pub struct ExperimentSettings {
    mode: AtomicU8,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self::with_mode(ExperimentMode::default())
    }
}

impl ExperimentSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings starting from `mode` instead of the default
    pub fn with_mode(mode: ExperimentMode) -> Self {
        Self {
            mode: AtomicU8::new(mode.to_u8()),
        }
    }

    /// Current mode, read once per triggering query
    pub fn mode(&self) -> ExperimentMode {
        ExperimentMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// `SET name = value`
    pub fn set(&self, name: &str, value: &str, privilege: Privilege) -> SettingResult<()> {
        Self::check_name(name)?;
        if privilege != Privilege::Superuser {
            return Err(SettingError::PermissionDenied(name.to_string()));
        }
        let mode = ExperimentMode::parse(value).ok_or_else(|| SettingError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })?;

        self.store(mode);
        Ok(())
    }

    /// `RESET name`
    pub fn reset(&self, name: &str, privilege: Privilege) -> SettingResult<()> {
        self.set(name, ExperimentMode::default().as_str(), privilege)
    }

    /// `SHOW name`
    pub fn show(&self, name: &str) -> SettingResult<String> {
        Self::check_name(name)?;
        Ok(self.mode().as_str().to_string())
    }

    fn check_name(name: &str) -> SettingResult<()> {
        if !name.eq_ignore_ascii_case(EXPERIMENT_MODE) {
            return Err(SettingError::UnknownSetting(name.to_string()));
        }
        Ok(())
    }

    fn store(&self, mode: ExperimentMode) {
        let previous = ExperimentMode::from_u8(self.mode.swap(mode.to_u8(), Ordering::AcqRel));
        if previous != mode {
            log_event(
                Event::ModeChanged,
                &[("from", previous.as_str()), ("to", mode.as_str())],
            );
        }
    }
}
