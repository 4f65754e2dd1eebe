//! Mode control
//!
//! - [`ExperimentSettings`]: the `experiment_mode` runtime setting
//! - [`ModeController`]: per-query dispatch to the warmer or the evictor
//! - [`QueryHook`]: lifecycle entry points with an explicit continuation

mod controller;
mod hook;
mod mode;
mod settings;

pub use controller::{EventOutcome, ModeController};
pub use hook::QueryHook;
pub use mode::{ExperimentMode, TriggerPoint};
pub use settings::{ExperimentSettings, Privilege, SettingError, SettingResult, EXPERIMENT_MODE};
