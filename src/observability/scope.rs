//! Begin/complete logging around one unit of work
//!
//! - `<NAME>_BEGIN` on creation
//! - `<NAME>_COMPLETE` or `<NAME>_FAILED` when closed, with elapsed time
//! - `<NAME>_INCOMPLETE` at WARN if dropped without being closed

use std::time::Instant;

use super::logger::Logger;

/// Logs the lifecycle of one warming batch, eviction or benchmark run
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    started: Timer,
    closed: bool,
}

impl ObservationScope {
    /// Opens a scope and logs `<name>_BEGIN` with `fields`
    pub fn new(name: &'static str, fields: &[(&'static str, String)]) -> Self {
        let scope = Self {
            name,
            fields: fields.to_vec(),
            started: Timer::new(),
            closed: false,
        };
        scope.emit("BEGIN", &[]);
        scope
    }

    /// Closes the scope successfully, adding `extra` to the scope fields
    pub fn complete(mut self, extra: &[(&'static str, String)]) {
        self.closed = true;
        let mut fields = extra.to_vec();
        fields.push(("elapsed_us", self.started.elapsed_us().to_string()));
        self.emit("COMPLETE", &fields);
    }

    /// Closes the scope as failed
    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        let event = format!("{}_FAILED", self.name);
        let mut owned = self.fields.clone();
        owned.push(("reason", reason.to_string()));
        owned.push(("elapsed_us", self.started.elapsed_us().to_string()));
        let refs: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Logger::error(&event, &refs);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn emit(&self, suffix: &str, extra: &[(&'static str, String)]) {
        let event = format!("{}_{}", self.name, suffix);
        let refs: Vec<(&str, &str)> = self
            .fields
            .iter()
            .chain(extra.iter())
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        Logger::info(&event, &refs);
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            let event = format!("{}_INCOMPLETE", self.name);
            Logger::warn(&event, &[("reason", "scope dropped without completion")]);
        }
    }
}

/// Monotonic elapsed-time measurement
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_us(&self) -> u128 {
        self.start.elapsed().as_micros()
    }

    /// Elapsed milliseconds with microsecond resolution
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_complete_marks_closed() {
        let scope = ObservationScope::new("PREWARM", &[("objects", "3".to_string())]);
        assert!(!scope.is_closed());
        scope.complete(&[("blocks", "12".to_string())]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("EVICT", &[]);
        scope.fail("flush failed");
    }

    #[test]
    fn test_scope_drop_without_close_does_not_panic() {
        let scope = ObservationScope::new("EVICT", &[("database", "1".to_string())]);
        drop(scope);
    }

    #[test]
    fn test_timer_advances() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_us() >= 5_000);
        assert!(timer.elapsed_ms() >= 5.0);
    }
}
