//! Mode controller
//!
//! Dispatches one triggering query to the warmer or the evictor. Each call is
//! independent: nothing is carried from one query to the next.
//!
//! Errors never escape. A rejected plan or a failed eviction is logged,
//! counted and returned as an outcome. The query always runs anyway.

use serde::Serialize;

use super::mode::ExperimentMode;
use crate::buffer::BufferManager;
use crate::ids::DatabaseId;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::plan::{PlanNode, PlanTreeWalker, RangeTableEntry};
use crate::prewarm::{CacheEvictor, CacheWarmer, EvictionStats, WarmOutcome, WarmReport};

/// What one triggering event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Mode was off
    Skipped,
    /// Hot mode: per-object warming results
    Warmed(WarmReport),
    /// Cold mode: the database was flushed and dropped
    Evicted(EvictionStats),
    /// Priming for this event was given up
    Abandoned { code: &'static str, reason: String },
}

impl EventOutcome {
    pub fn is_abandoned(&self) -> bool {
        matches!(self, EventOutcome::Abandoned { .. })
    }
}

/// Runs the per-query cache action for the current mode
pub struct ModeController<'a, B: BufferManager + ?Sized> {
    buffers: &'a B,
    walker: PlanTreeWalker,
    metrics: &'a MetricsRegistry,
}

impl<'a, B: BufferManager + ?Sized> ModeController<'a, B> {
    pub fn new(buffers: &'a B, walker: PlanTreeWalker, metrics: &'a MetricsRegistry) -> Self {
        Self {
            buffers,
            walker,
            metrics,
        }
    }

    /// Handles one triggering query.
    ///
    /// `mode` is the value read at the start of the event. Cold mode ignores
    /// the plan and range table entirely.
    pub fn on_query(
        &self,
        mode: ExperimentMode,
        plan: Option<&PlanNode>,
        range_table: &[RangeTableEntry],
        database: DatabaseId,
    ) -> EventOutcome {
        if mode == ExperimentMode::Off {
            self.metrics.increment_events_skipped();
            return EventOutcome::Skipped;
        }

        self.metrics.increment_events_fired();
        let database_str = database.to_string();
        log_event(
            Event::HookFired,
            &[("database", &database_str), ("mode", mode.as_str())],
        );

        match mode {
            ExperimentMode::Hot => self.warm(plan, range_table, database),
            ExperimentMode::Cold => self.evict(database),
            ExperimentMode::Off => EventOutcome::Skipped,
        }
    }

    fn warm(
        &self,
        plan: Option<&PlanNode>,
        range_table: &[RangeTableEntry],
        database: DatabaseId,
    ) -> EventOutcome {
        let objects = match self.walker.resolve(plan, range_table) {
            Ok(objects) => objects,
            Err(e) => {
                self.metrics.increment_plans_rejected();
                let database_str = database.to_string();
                log_event(
                    Event::PlanRejected,
                    &[
                        ("code", e.code().code()),
                        ("database", &database_str),
                        ("error", e.message()),
                    ],
                );
                return EventOutcome::Abandoned {
                    code: e.code().code(),
                    reason: e.message().to_string(),
                };
            }
        };

        let report = CacheWarmer::new(self.buffers, database).prewarm_all(&objects);
        for outcome in &report.outcomes {
            match outcome {
                WarmOutcome::Warmed { blocks, .. } => self.metrics.record_object_warmed(*blocks),
                WarmOutcome::Failed { .. } => self.metrics.increment_objects_failed(),
            }
        }

        EventOutcome::Warmed(report)
    }

    fn evict(&self, database: DatabaseId) -> EventOutcome {
        match CacheEvictor::new(self.buffers).evict_database(database) {
            Ok(stats) => {
                self.metrics.record_eviction(stats.flushed, stats.dropped);
                EventOutcome::Evicted(stats)
            }
            Err(e) => {
                self.metrics.increment_evictions_failed();
                let database_str = database.to_string();
                log_event(
                    Event::EvictionFailed,
                    &[
                        ("code", e.code().code()),
                        ("database", &database_str),
                        ("error", e.message()),
                    ],
                );
                EventOutcome::Abandoned {
                    code: e.code().code(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
