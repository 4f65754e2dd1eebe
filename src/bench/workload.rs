//! Benchmark workloads
//!
//! A workload names the relations of one database, with their sizes in
//! pages, and a list of queries given as planned statements. Loading writes
//! deterministic page contents so that two loads of the same workload are
//! byte-identical and checksums are comparable across runs.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{WorkloadError, WorkloadResult};
use crate::buffer::{BufferResult, PageStore};
use crate::ids::{BlockNumber, DatabaseId, ObjectId, BLOCK_SIZE};
use crate::observability::{log_event, Event};
use crate::plan::{PlanNode, PlanTreeWalker, PlannedStatement, RangeTableEntry, ScanReference};

/// One relation (table or index) of the workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    pub object: ObjectId,
    pub name: String,
    pub pages: u32,
}

/// One query of the workload, already planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDef {
    pub name: String,
    #[serde(default)]
    pub plan: Option<PlanNode>,
    #[serde(default)]
    pub range_table: Vec<RangeTableEntry>,
}

impl QueryDef {
    /// The planned statement handed to the hook
    pub fn statement(&self, database: DatabaseId) -> PlannedStatement {
        PlannedStatement::new(database, self.plan.clone(), self.range_table.clone())
    }

    /// Scan nodes of the plan in execution order
    pub fn scans(&self) -> WorkloadResult<Vec<ScanReference>> {
        PlanTreeWalker::resolve_scans(self.plan.as_ref(), &self.range_table).map_err(|e| {
            WorkloadError::Invalid(format!("query '{}': {}", self.name, e))
        })
    }
}

/// Benchmark workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub database: DatabaseId,
    #[serde(default)]
    pub relations: Vec<RelationDef>,
    #[serde(default)]
    pub queries: Vec<QueryDef>,
}

impl Workload {
    /// Load and validate a workload file
    pub fn from_file(path: &Path) -> WorkloadResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| WorkloadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a workload from JSON
    pub fn from_json(content: &str) -> WorkloadResult<Self> {
        let workload: Workload = serde_json::from_str(content)?;
        workload.validate()?;
        Ok(workload)
    }

    /// Checks names are unique and that every query resolves against its
    /// range table to declared relations only.
    pub fn validate(&self) -> WorkloadResult<()> {
        let mut objects = HashSet::new();
        for relation in &self.relations {
            if !objects.insert(relation.object) {
                return Err(WorkloadError::Invalid(format!(
                    "relation {} declared twice",
                    relation.object
                )));
            }
        }

        let mut names = HashSet::new();
        for query in &self.queries {
            if query.name.trim().is_empty() {
                return Err(WorkloadError::Invalid("query name must not be empty".to_string()));
            }
            if !names.insert(query.name.as_str()) {
                return Err(WorkloadError::Invalid(format!(
                    "query '{}' declared twice",
                    query.name
                )));
            }

            for scan in query.scans()? {
                for object in std::iter::once(scan.relation).chain(scan.index) {
                    if !objects.contains(&object) {
                        return Err(WorkloadError::Invalid(format!(
                            "query '{}' scans undeclared relation {}",
                            query.name, object
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn query(&self, name: &str) -> Option<&QueryDef> {
        self.queries.iter().find(|q| q.name == name)
    }

    /// Declared relation ids in ascending order
    pub fn objects(&self) -> Vec<ObjectId> {
        let mut objects: Vec<ObjectId> = self.relations.iter().map(|r| r.object).collect();
        objects.sort();
        objects
    }

    /// Recreates every relation in `store` with deterministic contents.
    ///
    /// Returns the number of pages written. Existing relation files are
    /// replaced, so loading twice leaves the same bytes on disk.
    pub fn load(&self, store: &dyn PageStore) -> WorkloadResult<u64> {
        let mut written = 0u64;

        for relation in &self.relations {
            if store.relation_exists(self.database, relation.object) {
                store.drop_relation(self.database, relation.object)?;
            }
            store.create_relation(self.database, relation.object)?;

            for block in 0..relation.pages {
                let page = page_image(self.database, relation.object, block);
                store.write_block(self.database, relation.object, block, &page)?;
                written += 1;
            }
        }
        store.sync_database(self.database)?;

        let database_str = self.database.to_string();
        let relations_str = self.relations.len().to_string();
        let pages_str = written.to_string();
        log_event(
            Event::WorkloadLoaded,
            &[
                ("database", &database_str),
                ("pages", &pages_str),
                ("relations", &relations_str),
            ],
        );

        Ok(written)
    }

    /// CRC32 over every declared relation as stored in `store`
    pub fn checksum(&self, store: &dyn PageStore) -> BufferResult<u32> {
        dataset_checksum(store, self.database, &self.objects())
    }
}

/// Deterministic contents of one workload page.
///
/// The first 12 bytes identify the page; the rest is a xorshift stream
/// seeded from the same triple.
pub fn page_image(database: DatabaseId, object: ObjectId, block: BlockNumber) -> Vec<u8> {
    let mut page = vec![0u8; BLOCK_SIZE];
    page[0..4].copy_from_slice(&database.value().to_le_bytes());
    page[4..8].copy_from_slice(&object.value().to_le_bytes());
    page[8..12].copy_from_slice(&block.to_le_bytes());

    let mut state = (u64::from(database.value()) << 40)
        ^ (u64::from(object.value()) << 20)
        ^ u64::from(block)
        ^ 0x9E37_79B9_7F4A_7C15;
    for chunk in page[16..].chunks_mut(8) {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        chunk.copy_from_slice(&state.to_le_bytes()[..chunk.len()]);
    }

    page
}

/// CRC32 over `objects` in the given order: object id, block count, then
/// every block.
pub fn dataset_checksum(
    store: &dyn PageStore,
    database: DatabaseId,
    objects: &[ObjectId],
) -> BufferResult<u32> {
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; BLOCK_SIZE];

    for &object in objects {
        let nblocks = store.block_count(database, object)?;
        hasher.update(&object.value().to_le_bytes());
        hasher.update(&nblocks.to_le_bytes());

        for block in 0..nblocks {
            store.read_block(database, object, block, &mut buf)?;
            hasher.update(&buf);
        }
    }

    Ok(hasher.finalize())
}
