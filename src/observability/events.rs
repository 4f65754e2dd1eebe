//! Observable events for the cache controller
//!
//! Point events. Work with a duration (a warming batch, an eviction, a
//! benchmark run) is logged through `ObservationScope` as `PREWARM_*`,
//! `EVICT_*` and `BENCH_*` begin/complete/failed pairs instead.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// experiment_mode changed by an administrator
    ModeChanged,

    // Hook
    /// Controller invoked for a query
    HookFired,
    /// Plan could not be resolved; priming abandoned for this query
    PlanRejected,

    // Prewarm
    /// One object in a batch could not be warmed
    PrewarmObjectFailed,
    /// Cold-mode eviction gave up before dropping anything
    EvictionFailed,

    // Benchmark
    /// Workload relations written to the page store
    WorkloadLoaded,
    /// One mode of a benchmark run finished
    BenchModeComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ModeChanged => "EXPERIMENT_MODE_CHANGED",

            Event::HookFired => "HOOK_FIRED",
            Event::PlanRejected => "PLAN_REJECTED",

            Event::PrewarmObjectFailed => "PREWARM_OBJECT_FAILED",
            Event::EvictionFailed => "EVICTION_FAILED",

            Event::WorkloadLoaded => "WORKLOAD_LOADED",
            Event::BenchModeComplete => "BENCH_MODE_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::HookFired => Severity::Trace,
            Event::PlanRejected | Event::PrewarmObjectFailed | Event::EvictionFailed => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake() {
        for event in [
            Event::ConfigLoaded,
            Event::ModeChanged,
            Event::PrewarmObjectFailed,
            Event::EvictionFailed,
            Event::BenchModeComplete,
        ] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{}", name);
        }
    }

    #[test]
    fn test_failure_events_are_not_info() {
        assert_eq!(Event::PrewarmObjectFailed.severity(), Severity::Warn);
        assert_eq!(Event::PlanRejected.severity(), Severity::Warn);
        assert_eq!(Event::EvictionFailed.severity(), Severity::Warn);
        assert_eq!(Event::ConfigLoaded.severity(), Severity::Info);
    }
}
