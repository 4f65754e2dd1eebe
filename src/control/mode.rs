//! Experiment mode and trigger point

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the controller does for each triggering query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentMode {
    /// Warm every object the plan scans
    Hot,
    /// Flush and drop the whole database from the cache
    #[default]
    Cold,
    /// Do nothing
    Off,
}

impl ExperimentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentMode::Hot => "hot",
            ExperimentMode::Cold => "cold",
            ExperimentMode::Off => "off",
        }
    }

    /// Parses the setting spelling, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hot" => Some(ExperimentMode::Hot),
            "cold" => Some(ExperimentMode::Cold),
            "off" => Some(ExperimentMode::Off),
            _ => None,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            ExperimentMode::Hot => 0,
            ExperimentMode::Cold => 1,
            ExperimentMode::Off => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ExperimentMode::Hot,
            2 => ExperimentMode::Off,
            _ => ExperimentMode::Cold,
        }
    }
}

impl fmt::Display for ExperimentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point in the query lifecycle where the hook fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPoint {
    /// Right after the planner returns
    PostPlanning,
    /// When the executor is about to run the plan
    #[default]
    PreExecution,
}

impl TriggerPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerPoint::PostPlanning => "post_planning",
            TriggerPoint::PreExecution => "pre_execution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_cold() {
        assert_eq!(ExperimentMode::default(), ExperimentMode::Cold);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(ExperimentMode::parse("HOT"), Some(ExperimentMode::Hot));
        assert_eq!(ExperimentMode::parse(" off "), Some(ExperimentMode::Off));
        assert_eq!(ExperimentMode::parse("warm"), None);
    }

    #[test]
    fn test_u8_encoding_roundtrips() {
        for mode in [ExperimentMode::Hot, ExperimentMode::Cold, ExperimentMode::Off] {
            assert_eq!(ExperimentMode::from_u8(mode.to_u8()), mode);
        }
    }

    #[test]
    fn test_serde_spelling() {
        assert_eq!(serde_json::to_string(&ExperimentMode::Hot).unwrap(), "\"hot\"");
        let point: TriggerPoint = serde_json::from_str("\"post_planning\"").unwrap();
        assert_eq!(point, TriggerPoint::PostPlanning);
        assert_eq!(point.as_str(), "post_planning");
    }
}
