//! Warm versus cold benchmark harness
//!
//! Loads a workload into a page store, then runs its queries once per
//! experiment mode and reports time, shared hits and shared reads per query.
//! A checksum of the dataset is taken before the run and after every mode;
//! eviction must never change stored data.

mod errors;
mod report;
mod runner;
mod workload;

pub use errors::{BenchError, BenchResult, WorkloadError, WorkloadResult};
pub use report::{BenchReport, ModeSummary, QueryRow, CSV_HEADER};
pub use runner::{BenchRunner, DEFAULT_MODES};
pub use workload::{dataset_checksum, page_image, QueryDef, RelationDef, Workload};
