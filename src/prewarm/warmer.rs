//! Cache warmer
//!
//! Loads every block of a relation into the shared cache through the normal
//! read path, in ascending block order, releasing each page right after the
//! fetch. No page stays pinned across iterations.

use serde::Serialize;

use crate::buffer::{BufferManager, BufferResult, RelationHandle};
use crate::ids::{DatabaseId, ObjectId};
use crate::observability::{log_event, Event, ObservationScope};

/// Result of warming one object in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WarmOutcome {
    Warmed { object: ObjectId, blocks: u64 },
    Failed { object: ObjectId, code: &'static str, error: String },
}

impl WarmOutcome {
    pub fn object(&self) -> ObjectId {
        match self {
            WarmOutcome::Warmed { object, .. } | WarmOutcome::Failed { object, .. } => *object,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WarmOutcome::Failed { .. })
    }
}

/// Per-object outcomes of a warming batch, in batch order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    pub outcomes: Vec<WarmOutcome>,
}

impl WarmReport {
    /// Total blocks fetched across the batch
    pub fn blocks_warmed(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                WarmOutcome::Warmed { blocks, .. } => *blocks,
                WarmOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &WarmOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Prewarms relations of one database
pub struct CacheWarmer<'a, B: BufferManager + ?Sized> {
    buffers: &'a B,
    database: DatabaseId,
}

impl<'a, B: BufferManager + ?Sized> CacheWarmer<'a, B> {
    pub fn new(buffers: &'a B, database: DatabaseId) -> Self {
        Self { buffers, database }
    }

    /// Fetches blocks `0..block_count` of `object` into the cache.
    ///
    /// Returns the number of blocks fetched. The relation is opened for
    /// shared read and closed again whether or not the walk succeeds.
    ///
    /// # Errors
    ///
    /// - `HC_OBJECT_NOT_FOUND` if the relation cannot be opened
    /// - `HC_HOST_IO_ERROR` if a block cannot be read
    pub fn prewarm(&self, object: ObjectId) -> BufferResult<u64> {
        let relation = self.buffers.open_relation(self.database, object)?;
        let result = self.warm_blocks(&relation);
        self.buffers.close_relation(relation);
        result
    }

    fn warm_blocks(&self, relation: &RelationHandle) -> BufferResult<u64> {
        let nblocks = self.buffers.block_count(relation)?;

        for block in 0..nblocks {
            let buffer = self.buffers.read_buffer(relation, block)?;
            self.buffers.release_buffer(buffer);
        }

        Ok(u64::from(nblocks))
    }

    /// Warms each object in order. A failure is recorded for that object
    /// and the batch moves on to the next one.
    pub fn prewarm_all(&self, objects: &[ObjectId]) -> WarmReport {
        let scope = ObservationScope::new(
            "PREWARM",
            &[
                ("database", self.database.to_string()),
                ("objects", objects.len().to_string()),
            ],
        );

        let mut report = WarmReport {
            outcomes: Vec::with_capacity(objects.len()),
        };

        for &object in objects {
            match self.prewarm(object) {
                Ok(blocks) => report.outcomes.push(WarmOutcome::Warmed { object, blocks }),
                Err(e) => {
                    let object_str = object.to_string();
                    let error = e.to_string();
                    log_event(
                        Event::PrewarmObjectFailed,
                        &[
                            ("code", e.code().code()),
                            ("error", &error),
                            ("object", &object_str),
                        ],
                    );
                    report.outcomes.push(WarmOutcome::Failed {
                        object,
                        code: e.code().code(),
                        error,
                    });
                }
            }
        }

        scope.complete(&[
            ("blocks", report.blocks_warmed().to_string()),
            ("failed", report.failed_count().to_string()),
        ]);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferTag, MemoryPageStore, PageStore, SharedBufferPool};
    use crate::ids::BLOCK_SIZE;
    use std::sync::Arc;

    const DB: DatabaseId = DatabaseId::new(1);

    fn pool_with(relations: &[(u32, u32)]) -> SharedBufferPool {
        let store = Arc::new(MemoryPageStore::new());
        for &(object, pages) in relations {
            let object = ObjectId::new(object);
            store.create_relation(DB, object).unwrap();
            for block in 0..pages {
                store.write_block(DB, object, block, &vec![0u8; BLOCK_SIZE]).unwrap();
            }
        }
        SharedBufferPool::new(store, 64)
    }

    #[test]
    fn test_prewarm_caches_every_block() {
        let pool = pool_with(&[(10, 4)]);
        let warmer = CacheWarmer::new(&pool, DB);

        assert_eq!(warmer.prewarm(ObjectId::new(10)).unwrap(), 4);
        for block in 0..4 {
            assert!(pool.is_cached(BufferTag::new(DB, ObjectId::new(10), block)));
        }
        assert_eq!(pool.pinned_pages(), 0);
        assert_eq!(pool.open_relations(), 0);
    }

    #[test]
    fn test_empty_relation_fetches_nothing() {
        let pool = pool_with(&[(10, 0)]);
        let warmer = CacheWarmer::new(&pool, DB);

        assert_eq!(warmer.prewarm(ObjectId::new(10)).unwrap(), 0);
        let stats = pool.stats();
        assert_eq!(stats.hits + stats.reads, 0);
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let pool = pool_with(&[]);
        let err = CacheWarmer::new(&pool, DB)
            .prewarm(ObjectId::new(404))
            .unwrap_err();
        assert!(err.is_object_not_found());
    }

    #[test]
    fn test_batch_continues_past_missing_object() {
        let pool = pool_with(&[(20, 3)]);
        let report =
            CacheWarmer::new(&pool, DB).prewarm_all(&[ObjectId::new(404), ObjectId::new(20)]);

        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(
            &report.outcomes[0],
            WarmOutcome::Failed { code: "HC_OBJECT_NOT_FOUND", .. }
        ));
        assert_eq!(
            report.outcomes[1],
            WarmOutcome::Warmed { object: ObjectId::new(20), blocks: 3 }
        );
        assert_eq!(report.blocks_warmed(), 3);
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_repeated_object_is_a_cache_hit() {
        let pool = pool_with(&[(10, 2)]);
        let report = CacheWarmer::new(&pool, DB).prewarm_all(&[ObjectId::new(10), ObjectId::new(10)]);

        assert_eq!(report.blocks_warmed(), 4);
        let stats = pool.stats();
        assert_eq!(stats.reads, 2);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let report = WarmReport {
            outcomes: vec![WarmOutcome::Warmed { object: ObjectId::new(1), blocks: 2 }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "warmed");
        assert_eq!(json["outcomes"][0]["blocks"], 2);
    }
}
