//! Plan tree walker
//!
//! Resolves the storage objects a physical plan will touch.
//!
//! Traversal is pre-order depth-first: node, then the whole left subtree,
//! then the whole right subtree. Output keeps traversal order and keeps
//! duplicates; warming the same object twice is a no-op on the cache.

use serde::{Deserialize, Serialize};

use super::errors::{PlanError, PlanResult};
use super::node::{PlanNode, RangeTableEntry};
use crate::ids::ObjectId;

/// Ordered object list in traversal order, duplicates permitted
pub type ObjectReferenceList = Vec<ObjectId>;

/// Which object an index-driven scan contributes as a warming target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexScanTarget {
    /// The heap the index points into
    #[default]
    BaseTable,
    /// The index's own pages
    Index,
    /// Heap first, then the index
    Both,
}

impl IndexScanTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexScanTarget::BaseTable => "base_table",
            IndexScanTarget::Index => "index",
            IndexScanTarget::Both => "both",
        }
    }
}

/// One resolved scan node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanReference {
    /// Node kind label
    pub node: &'static str,
    /// Base relation resolved through the range table
    pub relation: ObjectId,
    /// Index named by the node, for index-driven scans
    pub index: Option<ObjectId>,
}

/// Resolves plan trees into warming targets
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanTreeWalker {
    index_target: IndexScanTarget,
}

impl PlanTreeWalker {
    pub fn new(index_target: IndexScanTarget) -> Self {
        Self { index_target }
    }

    pub fn index_target(&self) -> IndexScanTarget {
        self.index_target
    }

    /// Resolves the ordered list of objects to warm for `root`.
    ///
    /// A null root yields an empty list. The first invalid range table
    /// reference aborts the walk and is returned; no partial list is produced.
    pub fn resolve(
        &self,
        root: Option<&PlanNode>,
        range_table: &[RangeTableEntry],
    ) -> PlanResult<ObjectReferenceList> {
        let scans = Self::resolve_scans(root, range_table)?;

        let mut objects = Vec::with_capacity(scans.len());
        for scan in &scans {
            match (scan.index, self.index_target) {
                (None, _) | (Some(_), IndexScanTarget::BaseTable) => objects.push(scan.relation),
                (Some(index), IndexScanTarget::Index) => objects.push(index),
                (Some(index), IndexScanTarget::Both) => {
                    objects.push(scan.relation);
                    objects.push(index);
                }
            }
        }

        Ok(objects)
    }

    /// Resolves every scan node in pre-order, keeping the index id of
    /// index-driven scans alongside the base relation.
    pub fn resolve_scans(
        root: Option<&PlanNode>,
        range_table: &[RangeTableEntry],
    ) -> PlanResult<Vec<ScanReference>> {
        let mut scans = Vec::new();

        // Explicit stack: deep join trees must not exhaust the thread stack.
        // Right is pushed before left so the left subtree is finished first.
        let mut stack: Vec<&PlanNode> = root.into_iter().collect();

        while let Some(node) = stack.pop() {
            if let Some(target) = node.kind.scan_relid() {
                let relation = Self::lookup(node.kind.label(), target, range_table)?;
                scans.push(ScanReference {
                    node: node.kind.label(),
                    relation,
                    index: node.kind.index_id(),
                });
            }

            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
        }

        Ok(scans)
    }

    /// Maps a 1-based range table index to its relation
    fn lookup(node: &'static str, target: u32, range_table: &[RangeTableEntry]) -> PlanResult<ObjectId> {
        let entry = (target as usize)
            .checked_sub(1)
            .and_then(|i| range_table.get(i))
            .ok_or_else(|| PlanError::target_out_of_range(node, target, range_table.len()))?;

        if !entry.is_relation() {
            return Err(PlanError::not_a_relation(node, target, entry.kind.as_str()));
        }

        Ok(entry.relid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::node::RteKind;

    fn oid(v: u32) -> ObjectId {
        ObjectId::new(v)
    }

    fn table(ids: &[u32]) -> Vec<RangeTableEntry> {
        ids.iter().map(|&v| RangeTableEntry::relation(oid(v))).collect()
    }

    #[test]
    fn test_preorder_with_index_scan_resolving_to_base_table() {
        let root = PlanNode::seq_scan(1).with_left(PlanNode::index_scan(2, oid(900)));
        let walker = PlanTreeWalker::default();

        let objects = walker.resolve(Some(&root), &table(&[100, 200])).unwrap();
        assert_eq!(objects, vec![oid(100), oid(200)]);
    }

    #[test]
    fn test_null_root_resolves_to_empty() {
        let walker = PlanTreeWalker::default();
        assert!(walker.resolve(None, &table(&[1, 2, 3])).unwrap().is_empty());
        assert!(walker.resolve(None, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_other_nodes_contribute_nothing_but_children_are_visited() {
        let root = PlanNode::other("Hash Join")
            .with_left(PlanNode::other("Sort").with_left(PlanNode::seq_scan(2)))
            .with_right(PlanNode::other("Hash").with_left(PlanNode::bitmap_heap_scan(1)));

        let objects = PlanTreeWalker::default()
            .resolve(Some(&root), &table(&[10, 20]))
            .unwrap();
        assert_eq!(objects, vec![oid(20), oid(10)]);

        let bare = PlanNode::other("Result").with_left(PlanNode::other("Limit"));
        assert!(PlanTreeWalker::default()
            .resolve(Some(&bare), &table(&[10]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_left_subtree_completes_before_right() {
        // (1 (2 (3) (4)) (5))
        let root = PlanNode::seq_scan(1)
            .with_left(
                PlanNode::seq_scan(2)
                    .with_left(PlanNode::seq_scan(3))
                    .with_right(PlanNode::seq_scan(4)),
            )
            .with_right(PlanNode::seq_scan(5));

        let objects = PlanTreeWalker::default()
            .resolve(Some(&root), &table(&[1, 2, 3, 4, 5]))
            .unwrap();
        assert_eq!(objects, vec![oid(1), oid(2), oid(3), oid(4), oid(5)]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let root = PlanNode::other("Nested Loop")
            .with_left(PlanNode::seq_scan(1))
            .with_right(PlanNode::index_only_scan(1, oid(7)));

        let objects = PlanTreeWalker::default()
            .resolve(Some(&root), &table(&[42]))
            .unwrap();
        assert_eq!(objects, vec![oid(42), oid(42)]);
    }

    #[test]
    fn test_target_past_end_is_invalid_reference() {
        let root = PlanNode::seq_scan(3);
        let err = PlanTreeWalker::default()
            .resolve(Some(&root), &table(&[1, 2]))
            .unwrap_err();
        assert_eq!(err.target(), Some(3));
        assert!(err.to_string().contains("HC_INVALID_PLAN_REFERENCE"));
    }

    #[test]
    fn test_target_zero_is_invalid_reference() {
        let root = PlanNode::bitmap_index_scan(0, oid(5));
        assert!(PlanTreeWalker::default()
            .resolve(Some(&root), &table(&[1]))
            .is_err());
    }

    #[test]
    fn test_error_in_right_subtree_discards_partial_result() {
        let root = PlanNode::other("Append")
            .with_left(PlanNode::seq_scan(1))
            .with_right(PlanNode::seq_scan(9));

        assert!(PlanTreeWalker::default()
            .resolve(Some(&root), &table(&[1]))
            .is_err());
    }

    #[test]
    fn test_non_relation_entry_is_invalid_reference() {
        let rt = vec![RangeTableEntry {
            kind: RteKind::Subquery,
            relid: oid(0),
        }];
        let err = PlanTreeWalker::default()
            .resolve(Some(&PlanNode::seq_scan(1)), &rt)
            .unwrap_err();
        assert!(err.message().contains("subquery"));
    }

    #[test]
    fn test_index_target_policies() {
        let root = PlanNode::seq_scan(1).with_left(PlanNode::index_scan(2, oid(900)));
        let rt = table(&[100, 200]);

        let index_only = PlanTreeWalker::new(IndexScanTarget::Index)
            .resolve(Some(&root), &rt)
            .unwrap();
        assert_eq!(index_only, vec![oid(100), oid(900)]);

        let both = PlanTreeWalker::new(IndexScanTarget::Both)
            .resolve(Some(&root), &rt)
            .unwrap();
        assert_eq!(both, vec![oid(100), oid(200), oid(900)]);
    }

    #[test]
    fn test_resolve_scans_retains_index_id() {
        let root = PlanNode::bitmap_heap_scan(1).with_left(PlanNode::bitmap_index_scan(1, oid(55)));
        let scans = PlanTreeWalker::resolve_scans(Some(&root), &table(&[10])).unwrap();

        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].node, "BitmapHeapScan");
        assert_eq!(scans[0].index, None);
        assert_eq!(scans[1].relation, oid(10));
        assert_eq!(scans[1].index, Some(oid(55)));
    }

    #[test]
    fn test_deep_left_chain_does_not_overflow() {
        let mut node = PlanNode::seq_scan(1);
        for _ in 0..50_000 {
            node = PlanNode::other("Materialize").with_left(node);
        }

        let objects = PlanTreeWalker::default()
            .resolve(Some(&node), &table(&[3]))
            .unwrap();
        assert_eq!(objects, vec![oid(3)]);

        // Dropping a 50k-deep Box chain recurses; unwind it iteratively.
        let mut cursor = Some(Box::new(node));
        while let Some(mut n) = cursor {
            cursor = n.left.take();
        }
    }

    #[test]
    fn test_index_target_spelling() {
        let target: IndexScanTarget = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(target, IndexScanTarget::Both);
        assert!(serde_json::from_str::<IndexScanTarget>("\"heap\"").is_err());
        assert_eq!(IndexScanTarget::default().as_str(), "base_table");
    }
}
