//! Observability for the cache controller
//!
//! - Structured JSON log lines named by typed [`Event`]s
//! - Passive counters in [`MetricsRegistry`]
//! - [`ObservationScope`] for begin/complete pairs
//!
//! Nothing here alters control flow. A failed log write is ignored.

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded, &[("data_dir", "/tmp/hotcold")]);
        log_event(Event::HookFired, &[]);
    }
}
