//! Plan Walker Tests
//!
//! Resolution of warming targets from physical plans:
//! - Pre-order traversal, left subtree before right
//! - Index-driven scans resolve through the range table
//! - Unrecognized nodes are transparent
//! - Bad range table references are errors, never skipped

use hotcold::ids::{DatabaseId, ObjectId};
use hotcold::plan::{
    IndexScanTarget, PlanErrorCode, PlanNode, PlanTreeWalker, PlannedStatement, RangeTableEntry,
    RteKind,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn oid(value: u32) -> ObjectId {
    ObjectId::new(value)
}

fn range_table(relids: &[u32]) -> Vec<RangeTableEntry> {
    relids.iter().map(|&r| RangeTableEntry::relation(oid(r))).collect()
}

// =============================================================================
// Traversal Order
// =============================================================================

/// Root scan, then its left index scan resolved to the base table.
#[test]
fn test_seq_scan_with_index_scan_child() {
    let plan = PlanNode::seq_scan(1).with_left(PlanNode::index_scan(2, oid(9001)));
    let walker = PlanTreeWalker::default();

    let objects = walker.resolve(Some(&plan), &range_table(&[100, 200])).unwrap();
    assert_eq!(objects, vec![oid(100), oid(200)]);
}

/// The whole left subtree is visited before anything on the right.
#[test]
fn test_left_subtree_before_right() {
    //          join
    //        /      \
    //     join       seq(4)
    //    /    \
    // seq(1) seq(2)
    //            \
    //           seq(3)
    let plan = PlanNode::other("HashJoin")
        .with_left(
            PlanNode::other("NestLoop")
                .with_left(PlanNode::seq_scan(1))
                .with_right(PlanNode::seq_scan(2).with_right(PlanNode::seq_scan(3))),
        )
        .with_right(PlanNode::seq_scan(4));

    let objects = PlanTreeWalker::default()
        .resolve(Some(&plan), &range_table(&[10, 20, 30, 40]))
        .unwrap();
    assert_eq!(objects, vec![oid(10), oid(20), oid(30), oid(40)]);
}

/// A null plan contributes nothing.
#[test]
fn test_null_plan_is_empty() {
    let objects = PlanTreeWalker::default().resolve(None, &range_table(&[1, 2, 3])).unwrap();
    assert!(objects.is_empty());
}

/// Unresolved nodes still have their children visited.
#[test]
fn test_other_nodes_are_transparent() {
    let only_other = PlanNode::other("Result").with_left(PlanNode::other("Limit"));
    assert!(PlanTreeWalker::default()
        .resolve(Some(&only_other), &[])
        .unwrap()
        .is_empty());

    let nested = PlanNode::other("Sort").with_left(
        PlanNode::other("Aggregate").with_right(PlanNode::bitmap_heap_scan(1)),
    );
    let objects = PlanTreeWalker::default()
        .resolve(Some(&nested), &range_table(&[77]))
        .unwrap();
    assert_eq!(objects, vec![oid(77)]);
}

/// The same table scanned twice appears twice.
#[test]
fn test_duplicates_are_kept() {
    let plan = PlanNode::other("Append")
        .with_left(PlanNode::seq_scan(1))
        .with_right(PlanNode::index_only_scan(1, oid(500)));

    let objects = PlanTreeWalker::default()
        .resolve(Some(&plan), &range_table(&[42]))
        .unwrap();
    assert_eq!(objects, vec![oid(42), oid(42)]);
}

// =============================================================================
// Index Scan Target
// =============================================================================

/// Each target policy over the same bitmap index scan.
#[test]
fn test_index_scan_target_policies() {
    let plan = PlanNode::bitmap_heap_scan(1).with_left(PlanNode::bitmap_index_scan(1, oid(600)));
    let rt = range_table(&[60]);

    let base = PlanTreeWalker::new(IndexScanTarget::BaseTable)
        .resolve(Some(&plan), &rt)
        .unwrap();
    assert_eq!(base, vec![oid(60), oid(60)]);

    let index = PlanTreeWalker::new(IndexScanTarget::Index)
        .resolve(Some(&plan), &rt)
        .unwrap();
    assert_eq!(index, vec![oid(60), oid(600)]);

    let both = PlanTreeWalker::new(IndexScanTarget::Both)
        .resolve(Some(&plan), &rt)
        .unwrap();
    assert_eq!(both, vec![oid(60), oid(60), oid(600)]);
}

/// Detailed resolution keeps the index id next to the base table.
#[test]
fn test_scan_references_keep_index() {
    let plan = PlanNode::seq_scan(1).with_left(PlanNode::index_scan(2, oid(9001)));
    let scans = PlanTreeWalker::resolve_scans(Some(&plan), &range_table(&[100, 200])).unwrap();

    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0].relation, oid(100));
    assert_eq!(scans[0].index, None);
    assert_eq!(scans[1].relation, oid(200));
    assert_eq!(scans[1].index, Some(oid(9001)));
}

// =============================================================================
// Invalid References
// =============================================================================

/// A target past the end of the range table is rejected.
#[test]
fn test_target_past_end_is_rejected() {
    let plan = PlanNode::seq_scan(1).with_right(PlanNode::seq_scan(3));
    let err = PlanTreeWalker::default()
        .resolve(Some(&plan), &range_table(&[1, 2]))
        .unwrap_err();

    assert_eq!(err.code(), PlanErrorCode::HcInvalidPlanReference);
    assert_eq!(err.target(), Some(3));
    assert!(err.to_string().contains("HC_INVALID_PLAN_REFERENCE"));
}

/// Target index zero is never valid.
#[test]
fn test_target_zero_is_rejected() {
    let err = PlanTreeWalker::default()
        .resolve(Some(&PlanNode::seq_scan(0)), &range_table(&[1]))
        .unwrap_err();
    assert_eq!(err.target(), Some(0));
}

/// A scan pointing at a subquery entry is rejected.
#[test]
fn test_non_relation_entry_is_rejected() {
    let rt = vec![RangeTableEntry {
        kind: RteKind::Subquery,
        relid: oid(0),
    }];
    let err = PlanTreeWalker::default()
        .resolve(Some(&PlanNode::seq_scan(1)), &rt)
        .unwrap_err();
    assert_eq!(err.code(), PlanErrorCode::HcInvalidPlanReference);
    assert!(err.message().contains("subquery"));
}

// =============================================================================
// Plan Input Format
// =============================================================================

/// Planned statements are accepted as JSON.
#[test]
fn test_planned_statement_from_json() {
    let stmt: PlannedStatement = serde_json::from_str(
        r#"{
            "database": 16384,
            "plan": {
                "type": "Other", "label": "HashJoin",
                "left": { "type": "SeqScan", "scan_relid": 1 },
                "right": { "type": "IndexOnlyScan", "scan_relid": 2, "index_id": 3001 }
            },
            "range_table": [ { "relid": 1259 }, { "kind": "relation", "relid": 2619 } ]
        }"#,
    )
    .unwrap();

    assert_eq!(stmt.database, DatabaseId::new(16384));
    let objects = PlanTreeWalker::default()
        .resolve(stmt.plan.as_ref(), &stmt.range_table)
        .unwrap();
    assert_eq!(objects, vec![oid(1259), oid(2619)]);
}
