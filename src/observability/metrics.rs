//! Controller metrics
//!
//! Monotonic counters only, reset on process start. Relaxed atomics: the
//! counters are passive and never feed back into control decisions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for hook invocations, warming and eviction
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Hook invocations that reached the controller with mode hot or cold
    events_fired: AtomicU64,
    /// Hook invocations with mode off
    events_skipped: AtomicU64,
    /// Plans rejected with an invalid range table reference
    plans_rejected: AtomicU64,
    /// Objects fully warmed
    objects_warmed: AtomicU64,
    /// Objects that could not be warmed
    objects_failed: AtomicU64,
    /// Blocks fetched by warming
    blocks_warmed: AtomicU64,
    /// Completed evictions
    evictions: AtomicU64,
    /// Evictions aborted by a flush failure
    evictions_failed: AtomicU64,
    /// Pages written back by eviction flushes
    pages_flushed: AtomicU64,
    /// Pages discarded by eviction drops
    pages_dropped: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_events_fired(&self) {
        self.events_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_skipped(&self) {
        self.events_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_rejected(&self) {
        self.plans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one successfully warmed object and its block count
    pub fn record_object_warmed(&self, blocks: u64) {
        self.objects_warmed.fetch_add(1, Ordering::Relaxed);
        self.blocks_warmed.fetch_add(blocks, Ordering::Relaxed);
    }

    pub fn increment_objects_failed(&self) {
        self.objects_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one completed eviction
    pub fn record_eviction(&self, flushed: u64, dropped: u64) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.pages_flushed.fetch_add(flushed, Ordering::Relaxed);
        self.pages_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    pub fn increment_evictions_failed(&self) {
        self.evictions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn blocks_warmed(&self) -> u64 {
        self.blocks_warmed.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_fired: self.events_fired.load(Ordering::Relaxed),
            events_skipped: self.events_skipped.load(Ordering::Relaxed),
            plans_rejected: self.plans_rejected.load(Ordering::Relaxed),
            objects_warmed: self.objects_warmed.load(Ordering::Relaxed),
            objects_failed: self.objects_failed.load(Ordering::Relaxed),
            blocks_warmed: self.blocks_warmed.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            evictions_failed: self.evictions_failed.load(Ordering::Relaxed),
            pages_flushed: self.pages_flushed.load(Ordering::Relaxed),
            pages_dropped: self.pages_dropped.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        // Serializing a struct of integers cannot fail
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub events_fired: u64,
    pub events_skipped: u64,
    pub plans_rejected: u64,
    pub objects_warmed: u64,
    pub objects_failed: u64,
    pub blocks_warmed: u64,
    pub evictions: u64,
    pub evictions_failed: u64,
    pub pages_flushed: u64,
    pub pages_dropped: u64,
}
