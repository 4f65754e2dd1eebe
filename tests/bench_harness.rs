//! Benchmark Harness Tests
//!
//! End to end over a file-backed data directory:
//! - cold mode reads every page from storage, hot mode finds it cached
//! - the dataset is unchanged after every mode
//! - reports render as CSV and JSON

use std::sync::Arc;

use hotcold::bench::{BenchRunner, Workload, CSV_HEADER, DEFAULT_MODES};
use hotcold::buffer::FilePageStore;
use hotcold::control::{ExperimentMode, TriggerPoint};
use hotcold::plan::IndexScanTarget;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

const WORKLOAD: &str = r#"{
    "database": 16384,
    "relations": [
        { "object": 1001, "name": "title", "pages": 8 },
        { "object": 1002, "name": "movie_info", "pages": 6 },
        { "object": 1003, "name": "movie_info_movie_id_idx", "pages": 2 },
        { "object": 1004, "name": "kind_type", "pages": 1 }
    ],
    "queries": [
        {
            "name": "01_title_scan",
            "plan": { "type": "SeqScan", "scan_relid": 1 },
            "range_table": [ { "relid": 1001 } ]
        },
        {
            "name": "02_info_join",
            "plan": {
                "type": "Other", "label": "NestLoop",
                "left": { "type": "SeqScan", "scan_relid": 1 },
                "right": { "type": "IndexScan", "scan_relid": 2, "index_id": 1003 }
            },
            "range_table": [ { "relid": 1004 }, { "relid": 1002 } ]
        },
        {
            "name": "03_constant",
            "plan": { "type": "Other", "label": "Result" },
            "range_table": []
        }
    ]
}"#;

fn loaded_store() -> (TempDir, Arc<FilePageStore>, Workload) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(FilePageStore::open(temp_dir.path()).unwrap());
    let workload = Workload::from_json(WORKLOAD).unwrap();
    workload.load(store.as_ref()).unwrap();
    (temp_dir, store, workload)
}

// =============================================================================
// Mode Comparison
// =============================================================================

/// Default order off, cold, hot; hot turns table reads into hits.
#[test]
fn test_modes_compare_as_expected() {
    let (_dir, store, workload) = loaded_store();
    let report = BenchRunner::new(store, 128).run(&workload, &DEFAULT_MODES).unwrap();

    let order: Vec<ExperimentMode> = report.modes.iter().map(|m| m.mode).collect();
    assert_eq!(order, DEFAULT_MODES.to_vec());
    assert_eq!(report.rows.len(), 9);

    let cold = report.summary(ExperimentMode::Cold).unwrap();
    assert_eq!(cold.shared_hits, 0, "cold mode must start every query uncached");
    assert_eq!(cold.shared_reads, 8 + 1 + 2 + 6);

    let hot = report.summary(ExperimentMode::Hot).unwrap();
    assert_eq!(hot.shared_reads, 2, "only the index is left for the executor");
    assert_eq!(hot.shared_hits, 8 + 1 + 6);

    // Off: a fresh pool, then nothing in between
    let off = report.summary(ExperimentMode::Off).unwrap();
    assert_eq!(off.shared_reads, 17);
    assert_eq!(off.metrics.events_fired, 0);
}

/// Warming base table and index leaves no reads at all.
#[test]
fn test_hot_both_targets() {
    let (_dir, store, workload) = loaded_store();
    let report = BenchRunner::new(store, 128)
        .with_index_target(IndexScanTarget::Both)
        .with_trigger_point(TriggerPoint::PostPlanning)
        .run(&workload, &[ExperimentMode::Hot])
        .unwrap();

    let hot = report.summary(ExperimentMode::Hot).unwrap();
    assert_eq!(hot.shared_reads, 0);
    assert_eq!(hot.shared_hits, 17);
    assert_eq!(hot.metrics.objects_warmed, 4);
    assert_eq!(hot.metrics.blocks_warmed, 17);
}

/// A query with no scans records zero hits and reads.
#[test]
fn test_scanless_query_has_no_buffer_traffic() {
    let (_dir, store, workload) = loaded_store();
    let report = BenchRunner::new(store, 128)
        .run(&workload, &[ExperimentMode::Cold])
        .unwrap();

    let row = report
        .rows
        .iter()
        .find(|r| r.query == "03_constant")
        .unwrap();
    assert_eq!((row.shared_hits, row.shared_reads), (0, 0));
}

// =============================================================================
// Data Integrity
// =============================================================================

/// The dataset checksum never changes across modes.
#[test]
fn test_dataset_unchanged_by_any_mode() {
    let (_dir, store, workload) = loaded_store();
    let before = workload.checksum(store.as_ref()).unwrap();

    let report = BenchRunner::new(store.clone(), 4)
        .run(&workload, &DEFAULT_MODES)
        .unwrap();

    assert_eq!(report.checksum_before, before);
    assert!(report.data_intact());
    assert_eq!(workload.checksum(store.as_ref()).unwrap(), before);
}

// =============================================================================
// Report Output
// =============================================================================

/// CSV has one line per query per mode after the header.
#[test]
fn test_report_csv_and_json() {
    let (_dir, store, workload) = loaded_store();
    let report = BenchRunner::new(store, 64)
        .run(&workload, &[ExperimentMode::Cold, ExperimentMode::Hot])
        .unwrap();

    let csv = report.to_csv();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 1 + 6);
    assert!(lines[1].starts_with("01_title_scan,cold,"));
    assert!(lines[4].starts_with("01_title_scan,hot,"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["database"], 16384);
    assert_eq!(json["rows"].as_array().unwrap().len(), 6);
    assert_eq!(json["modes"][1]["mode"], "hot");
}
