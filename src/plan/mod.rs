//! Plan subsystem
//!
//! Consumes the physical plan tree and range table produced by the host
//! planner and resolves the storage objects a query will scan.
//!
//! # Resolution rules
//!
//! - SeqScan, BitmapHeapScan: the range table entry's relation
//! - IndexScan, BitmapIndexScan, IndexOnlyScan: the base relation by default;
//!   the index, or both, under [`IndexScanTarget`]
//! - Any other operator: nothing, children still visited
//!
//! A target index outside the range table is `HC_INVALID_PLAN_REFERENCE`.

mod errors;
mod node;
mod walker;

pub use errors::{PlanError, PlanErrorCode, PlanResult};
pub use node::{NodeKind, PlanNode, PlannedStatement, RangeTableEntry, RteKind};
pub use walker::{IndexScanTarget, ObjectReferenceList, PlanTreeWalker, ScanReference};
