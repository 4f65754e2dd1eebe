//! Benchmark runner
//!
//! Runs every query of a workload once per mode. Each mode starts from a
//! fresh buffer pool, the equivalent of a server restart, so modes do not
//! inherit each other's cache.
//!
//! A query goes through the hook at both lifecycle points and then through a
//! simulated executor that reads every block of every scanned relation via
//! the pool. Hits and reads are counted around the executor only, so warming
//! and eviction traffic stays out of the per-query numbers. Execution time
//! covers hook and executor together.

use std::sync::Arc;

use super::errors::{BenchError, BenchResult};
use super::report::{BenchReport, ModeSummary, QueryRow};
use super::workload::Workload;
use crate::buffer::{
    BufferManager, BufferResult, BufferStats, PageStore, RelationHandle, SharedBufferPool,
};
use crate::control::{
    ExperimentMode, ExperimentSettings, ModeController, QueryHook, TriggerPoint,
};
use crate::ids::{DatabaseId, ObjectId};
use crate::observability::{log_event, Event, MetricsRegistry, ObservationScope, Timer};
use crate::plan::{IndexScanTarget, PlanTreeWalker, ScanReference};

/// Default mode order: baseline first, then cold, then hot
pub const DEFAULT_MODES: [ExperimentMode; 3] =
    [ExperimentMode::Off, ExperimentMode::Cold, ExperimentMode::Hot];

/// Runs workloads against a page store
pub struct BenchRunner {
    store: Arc<dyn PageStore>,
    shared_buffers: usize,
    index_target: IndexScanTarget,
    trigger: TriggerPoint,
}

impl BenchRunner {
    pub fn new(store: Arc<dyn PageStore>, shared_buffers: usize) -> Self {
        Self {
            store,
            shared_buffers,
            index_target: IndexScanTarget::default(),
            trigger: TriggerPoint::default(),
        }
    }

    pub fn with_index_target(mut self, index_target: IndexScanTarget) -> Self {
        self.index_target = index_target;
        self
    }

    pub fn with_trigger_point(mut self, trigger: TriggerPoint) -> Self {
        self.trigger = trigger;
        self
    }

    /// Runs `workload` once per entry of `modes`, in order.
    ///
    /// The workload must already be loaded into the store.
    pub fn run(&self, workload: &Workload, modes: &[ExperimentMode]) -> BenchResult<BenchReport> {
        if modes.is_empty() {
            return Err(BenchError::NoModes);
        }
        workload.validate()?;

        let scope = ObservationScope::new(
            "BENCH",
            &[
                ("database", workload.database.to_string()),
                ("modes", modes.len().to_string()),
                ("queries", workload.queries.len().to_string()),
            ],
        );

        let checksum_before = match workload.checksum(self.store.as_ref()) {
            Ok(checksum) => checksum,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(BenchError::Checksum(e));
            }
        };

        let mut report = BenchReport::new(workload.database, checksum_before);
        for &mode in modes {
            match self.run_mode(workload, mode, &mut report) {
                Ok(summary) => report.modes.push(summary),
                Err(e) => {
                    scope.fail(&e.to_string());
                    return Err(e);
                }
            }
        }

        scope.complete(&[
            ("data_intact", report.data_intact().to_string()),
            ("run_id", report.run_id.to_string()),
        ]);
        Ok(report)
    }

    fn run_mode(
        &self,
        workload: &Workload,
        mode: ExperimentMode,
        report: &mut BenchReport,
    ) -> BenchResult<ModeSummary> {
        let pool = SharedBufferPool::new(Arc::clone(&self.store), self.shared_buffers);
        let metrics = MetricsRegistry::new();
        let settings = ExperimentSettings::with_mode(mode);
        let controller = ModeController::new(&pool, PlanTreeWalker::new(self.index_target), &metrics);
        let hook = QueryHook::new(controller, &settings, self.trigger);

        let mut total_ms = 0.0;
        let mut total = BufferStats::default();

        for query in &workload.queries {
            let scans = query.scans()?;
            let stmt = query.statement(workload.database);
            let timer = Timer::new();
            let result = hook.post_planning(&stmt, |planned| {
                hook.executor_run(planned, |planned| execute(&pool, &scans, planned.database))
            });
            let execution_ms = timer.elapsed_ms();

            let stats = result.map_err(|source| BenchError::Query {
                query: query.name.clone(),
                mode: mode.as_str(),
                source,
            })?;

            total_ms += execution_ms;
            total.hits += stats.hits;
            total.reads += stats.reads;
            report.rows.push(QueryRow {
                query: query.name.clone(),
                mode,
                execution_ms,
                shared_hits: stats.hits,
                shared_reads: stats.reads,
            });
        }

        // Dirty pages belong on disk before the checksum; this pool is
        // discarded after the mode.
        pool.flush_database_buffers(workload.database)
            .map_err(BenchError::Checksum)?;
        let checksum = workload
            .checksum(self.store.as_ref())
            .map_err(BenchError::Checksum)?;

        let total_str = format!("{:.3}", total_ms);
        let hits_str = total.hits.to_string();
        let reads_str = total.reads.to_string();
        let checksum_str = format!("{:08x}", checksum);
        log_event(
            Event::BenchModeComplete,
            &[
                ("checksum", &checksum_str),
                ("mode", mode.as_str()),
                ("shared_hits", &hits_str),
                ("shared_reads", &reads_str),
                ("total_execution_ms", &total_str),
            ],
        );

        Ok(ModeSummary {
            mode,
            total_execution_ms: total_ms,
            shared_hits: total.hits,
            shared_reads: total.reads,
            checksum,
            metrics: metrics.snapshot(),
        })
    }
}

/// Simulated executor: every scan reads its whole heap, and index-driven
/// scans also read the whole index, in plan order.
fn execute(
    pool: &SharedBufferPool,
    scans: &[ScanReference],
    database: DatabaseId,
) -> BufferResult<BufferStats> {
    let before = pool.stats();
    for scan in scans {
        if let Some(index) = scan.index {
            scan_relation(pool, database, index)?;
        }
        scan_relation(pool, database, scan.relation)?;
    }
    Ok(pool.stats().since(&before))
}

fn scan_relation(pool: &SharedBufferPool, database: DatabaseId, object: ObjectId) -> BufferResult<()> {
    let relation = pool.open_relation(database, object)?;
    let result = read_all_blocks(pool, &relation);
    pool.close_relation(relation);
    result
}

fn read_all_blocks(pool: &SharedBufferPool, relation: &RelationHandle) -> BufferResult<()> {
    for block in 0..pool.block_count(relation)? {
        let buffer = pool.read_buffer(relation, block)?;
        pool.release_buffer(buffer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryPageStore;

    const WORKLOAD: &str = r#"{
        "database": 7,
        "relations": [
            { "object": 10, "name": "movies", "pages": 5 },
            { "object": 20, "name": "ratings", "pages": 3 },
            { "object": 21, "name": "ratings_pkey", "pages": 2 }
        ],
        "queries": [
            { "name": "scan", "plan": { "type": "SeqScan", "scan_relid": 1 },
              "range_table": [ { "relid": 10 } ] },
            { "name": "lookup", "plan": { "type": "IndexScan", "scan_relid": 1, "index_id": 21 },
              "range_table": [ { "relid": 20 } ] }
        ]
    }"#;

    fn setup() -> (Arc<MemoryPageStore>, Workload) {
        let store = Arc::new(MemoryPageStore::new());
        let workload = Workload::from_json(WORKLOAD).unwrap();
        workload.load(store.as_ref()).unwrap();
        (store, workload)
    }

    #[test]
    fn test_cold_reads_everything_hot_hits_heap() {
        let (store, workload) = setup();
        let report = BenchRunner::new(store, 64).run(&workload, &DEFAULT_MODES).unwrap();

        assert_eq!(report.rows.len(), 6);
        assert!(report.data_intact());

        let cold: Vec<_> = report.rows_for(ExperimentMode::Cold).collect();
        assert_eq!((cold[0].shared_hits, cold[0].shared_reads), (0, 5));
        assert_eq!((cold[1].shared_hits, cold[1].shared_reads), (0, 5));

        // Base-table warming leaves the index pages to the executor
        let hot: Vec<_> = report.rows_for(ExperimentMode::Hot).collect();
        assert_eq!((hot[0].shared_hits, hot[0].shared_reads), (5, 0));
        assert_eq!((hot[1].shared_hits, hot[1].shared_reads), (3, 2));
    }

    #[test]
    fn test_hot_with_both_targets_is_all_hits() {
        let (store, workload) = setup();
        let report = BenchRunner::new(store, 64)
            .with_index_target(IndexScanTarget::Both)
            .run(&workload, &[ExperimentMode::Hot])
            .unwrap();

        let summary = report.summary(ExperimentMode::Hot).unwrap();
        assert_eq!(summary.shared_reads, 0);
        assert_eq!(summary.shared_hits, 10);
        assert_eq!(summary.metrics.objects_warmed, 3);
    }

    #[test]
    fn test_off_mode_fires_nothing() {
        let (store, workload) = setup();
        let report = BenchRunner::new(store, 64).run(&workload, &[ExperimentMode::Off]).unwrap();

        let summary = report.summary(ExperimentMode::Off).unwrap();
        assert_eq!(summary.metrics.events_fired, 0);
        assert_eq!(summary.metrics.events_skipped, 2);
        assert_eq!(summary.shared_reads, 10);
    }

    #[test]
    fn test_fires_once_per_query_at_post_planning() {
        let (store, workload) = setup();
        let report = BenchRunner::new(store, 64)
            .with_trigger_point(TriggerPoint::PostPlanning)
            .run(&workload, &[ExperimentMode::Cold])
            .unwrap();

        assert_eq!(report.summary(ExperimentMode::Cold).unwrap().metrics.events_fired, 2);
    }

    #[test]
    fn test_no_modes_is_error() {
        let (store, workload) = setup();
        assert!(matches!(
            BenchRunner::new(store, 64).run(&workload, &[]),
            Err(BenchError::NoModes)
        ));
    }

    #[test]
    fn test_missing_relation_fails_checksum() {
        let (store, workload) = setup();
        store.drop_relation(workload.database, ObjectId::new(10)).unwrap();

        let err = BenchRunner::new(store, 64)
            .run(&workload, &[ExperimentMode::Off])
            .unwrap_err();
        assert!(matches!(err, BenchError::Checksum(_)));
    }
}
