//! Physical plan tree and range table as handed over by the planner
//!
//! The tree is immutable once built. Nodes own their children; the walker
//! only borrows. Scan nodes carry a 1-based index into the range table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{DatabaseId, ObjectId};

/// Operator kind of a plan node.
///
/// The set of scan kinds that resolve to storage objects is closed. Every
/// other operator (joins, sorts, aggregates, ...) is `Other` and contributes
/// only through its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Sequential heap scan
    SeqScan { scan_relid: u32 },
    /// Heap fetch driven by a bitmap
    BitmapHeapScan { scan_relid: u32 },
    /// Index scan with heap fetches
    IndexScan { scan_relid: u32, index_id: ObjectId },
    /// Index scan producing a bitmap
    BitmapIndexScan { scan_relid: u32, index_id: ObjectId },
    /// Index scan answered from the index alone where visibility allows
    IndexOnlyScan { scan_relid: u32, index_id: ObjectId },
    /// Any operator that does not scan a relation itself
    Other {
        #[serde(default)]
        label: String,
    },
}

impl NodeKind {
    /// Short label used in logs and errors
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::SeqScan { .. } => "SeqScan",
            NodeKind::BitmapHeapScan { .. } => "BitmapHeapScan",
            NodeKind::IndexScan { .. } => "IndexScan",
            NodeKind::BitmapIndexScan { .. } => "BitmapIndexScan",
            NodeKind::IndexOnlyScan { .. } => "IndexOnlyScan",
            NodeKind::Other { .. } => "Other",
        }
    }

    /// Range table target of a scan node, `None` for non-scan operators
    pub fn scan_relid(&self) -> Option<u32> {
        match self {
            NodeKind::SeqScan { scan_relid }
            | NodeKind::BitmapHeapScan { scan_relid }
            | NodeKind::IndexScan { scan_relid, .. }
            | NodeKind::BitmapIndexScan { scan_relid, .. }
            | NodeKind::IndexOnlyScan { scan_relid, .. } => Some(*scan_relid),
            NodeKind::Other { .. } => None,
        }
    }

    /// Index scanned by an index-driven node
    pub fn index_id(&self) -> Option<ObjectId> {
        match self {
            NodeKind::IndexScan { index_id, .. }
            | NodeKind::BitmapIndexScan { index_id, .. }
            | NodeKind::IndexOnlyScan { index_id, .. } => Some(*index_id),
            _ => None,
        }
    }
}

/// A node in the physical plan tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<PlanNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<PlanNode>>,
}

impl PlanNode {
    /// Creates a leaf node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            left: None,
            right: None,
        }
    }

    pub fn seq_scan(scan_relid: u32) -> Self {
        Self::new(NodeKind::SeqScan { scan_relid })
    }

    pub fn bitmap_heap_scan(scan_relid: u32) -> Self {
        Self::new(NodeKind::BitmapHeapScan { scan_relid })
    }

    pub fn index_scan(scan_relid: u32, index_id: ObjectId) -> Self {
        Self::new(NodeKind::IndexScan {
            scan_relid,
            index_id,
        })
    }

    pub fn bitmap_index_scan(scan_relid: u32, index_id: ObjectId) -> Self {
        Self::new(NodeKind::BitmapIndexScan {
            scan_relid,
            index_id,
        })
    }

    pub fn index_only_scan(scan_relid: u32, index_id: ObjectId) -> Self {
        Self::new(NodeKind::IndexOnlyScan {
            scan_relid,
            index_id,
        })
    }

    pub fn other(label: impl Into<String>) -> Self {
        Self::new(NodeKind::Other {
            label: label.into(),
        })
    }

    /// Attaches a left (outer) child
    pub fn with_left(mut self, child: PlanNode) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    /// Attaches a right (inner) child
    pub fn with_right(mut self, child: PlanNode) -> Self {
        self.right = Some(Box::new(child));
        self
    }
}

/// Kind of a range table entry. Only `Relation` entries name storage objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RteKind {
    Relation,
    Subquery,
    Join,
    Function,
    Values,
    Cte,
}

impl RteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RteKind::Relation => "relation",
            RteKind::Subquery => "subquery",
            RteKind::Join => "join",
            RteKind::Function => "function",
            RteKind::Values => "values",
            RteKind::Cte => "cte",
        }
    }
}

impl fmt::Display for RteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_rte_kind() -> RteKind {
    RteKind::Relation
}

/// One entry of the range table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTableEntry {
    #[serde(default = "default_rte_kind")]
    pub kind: RteKind,
    /// Storage object scanned through this entry
    pub relid: ObjectId,
}

impl RangeTableEntry {
    /// A plain relation entry
    pub fn relation(relid: ObjectId) -> Self {
        Self {
            kind: RteKind::Relation,
            relid,
        }
    }

    pub fn is_relation(&self) -> bool {
        self.kind == RteKind::Relation
    }
}

/// Fully planned statement: the uniform input at every trigger point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStatement {
    pub database: DatabaseId,
    #[serde(default)]
    pub plan: Option<PlanNode>,
    #[serde(default)]
    pub range_table: Vec<RangeTableEntry>,
}

impl PlannedStatement {
    pub fn new(database: DatabaseId, plan: Option<PlanNode>, range_table: Vec<RangeTableEntry>) -> Self {
        Self {
            database,
            plan,
            range_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_node_json_shape() {
        let json = r#"{
            "type": "Other",
            "label": "NestLoop",
            "left": { "type": "SeqScan", "scan_relid": 1 },
            "right": { "type": "IndexScan", "scan_relid": 2, "index_id": 2001 }
        }"#;

        let node: PlanNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind.label(), "Other");
        assert_eq!(node.left.as_ref().unwrap().kind.scan_relid(), Some(1));

        let right = node.right.as_ref().unwrap();
        assert_eq!(right.kind.index_id(), Some(ObjectId::new(2001)));
        assert!(right.left.is_none());
    }

    #[test]
    fn test_range_table_entry_defaults_to_relation() {
        let rte: RangeTableEntry = serde_json::from_str(r#"{ "relid": 16384 }"#).unwrap();
        assert!(rte.is_relation());
        assert_eq!(rte.relid, ObjectId::new(16384));

        let rte: RangeTableEntry =
            serde_json::from_str(r#"{ "kind": "subquery", "relid": 0 }"#).unwrap();
        assert_eq!(rte.kind, RteKind::Subquery);
    }

    #[test]
    fn test_non_scan_nodes_have_no_target() {
        let node = PlanNode::other("Sort");
        assert_eq!(node.kind.scan_relid(), None);
        assert_eq!(node.kind.index_id(), None);
    }
}
