//! Query lifecycle hook
//!
//! The host calls into [`QueryHook`] at both candidate points with the
//! planned statement and a continuation that runs the rest of the query.
//! The controller fires only at the configured point; the continuation runs
//! exactly once either way and its result is handed back unchanged.

use super::controller::{EventOutcome, ModeController};
use super::mode::TriggerPoint;
use super::settings::ExperimentSettings;
use crate::buffer::BufferManager;
use crate::plan::PlannedStatement;

/// Binds a controller to the runtime settings and a trigger point
pub struct QueryHook<'a, B: BufferManager + ?Sized> {
    controller: ModeController<'a, B>,
    settings: &'a ExperimentSettings,
    trigger: TriggerPoint,
}

impl<'a, B: BufferManager + ?Sized> QueryHook<'a, B> {
    pub fn new(
        controller: ModeController<'a, B>,
        settings: &'a ExperimentSettings,
        trigger: TriggerPoint,
    ) -> Self {
        Self {
            controller,
            settings,
            trigger,
        }
    }

    /// Called once the planner has produced `stmt`
    pub fn post_planning<R>(
        &self,
        stmt: &PlannedStatement,
        resume: impl FnOnce(&PlannedStatement) -> R,
    ) -> R {
        self.fire(TriggerPoint::PostPlanning, stmt);
        resume(stmt)
    }

    /// Called when the executor is about to run `stmt`
    pub fn executor_run<R>(
        &self,
        stmt: &PlannedStatement,
        resume: impl FnOnce(&PlannedStatement) -> R,
    ) -> R {
        self.fire(TriggerPoint::PreExecution, stmt);
        resume(stmt)
    }

    /// Runs the controller if `point` is the configured trigger point.
    ///
    /// The mode is read once here, so a concurrent `SET` applies to the
    /// next event only.
    pub fn fire(&self, point: TriggerPoint, stmt: &PlannedStatement) -> Option<EventOutcome> {
        if point != self.trigger {
            return None;
        }
        let mode = self.settings.mode();
        Some(
            self.controller
                .on_query(mode, stmt.plan.as_ref(), &stmt.range_table, stmt.database),
        )
    }
}
