//! Durable page storage underneath the shared buffer pool
//!
//! A page store holds one page file per relation, addressed by
//! `(database, object)`, made of fixed `BLOCK_SIZE` blocks. Writes become
//! durable only after `sync_database` returns.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::{BufferError, BufferResult};
use crate::ids::{BlockNumber, DatabaseId, ObjectId, BLOCK_SIZE};

/// Durable block storage for relations
pub trait PageStore: Send + Sync {
    /// Creates an empty relation. Creating an existing relation is a no-op.
    fn create_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<()>;

    /// Removes a relation and all of its blocks
    fn drop_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<()>;

    fn relation_exists(&self, database: DatabaseId, object: ObjectId) -> bool;

    /// Lists relations of a database in ascending object order
    fn relations(&self, database: DatabaseId) -> BufferResult<Vec<ObjectId>>;

    /// Current length of the relation in blocks
    fn block_count(&self, database: DatabaseId, object: ObjectId) -> BufferResult<BlockNumber>;

    /// Reads one block into `buf` (`BLOCK_SIZE` bytes)
    fn read_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        buf: &mut [u8],
    ) -> BufferResult<()>;

    /// Writes one block. Writing at `block_count` extends the relation.
    fn write_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        data: &[u8],
    ) -> BufferResult<()>;

    /// Makes every write to the database durable
    fn sync_database(&self, database: DatabaseId) -> BufferResult<()>;
}

pub(crate) fn check_block_len(len: usize) -> BufferResult<()> {
    if len != BLOCK_SIZE {
        return Err(BufferError::io_error_no_source(format!(
            "block buffer is {} bytes, expected {}",
            len, BLOCK_SIZE
        )));
    }
    Ok(())
}

type RelationKey = (DatabaseId, ObjectId);

/// In-process page store.
///
/// Writes are "durable" as soon as they land in the map. A failure switch
/// makes every write and sync fail with `HC_HOST_IO_ERROR` so callers can
/// exercise their failure paths.
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    relations: Mutex<BTreeMap<RelationKey, Vec<Box<[u8]>>>>,
    fail_writes: AtomicBool,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes and syncs fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the stored bytes of a block, bypassing any cache
    pub fn block_contents(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
    ) -> Option<Vec<u8>> {
        self.lock()
            .get(&(database, object))
            .and_then(|blocks| blocks.get(block as usize))
            .map(|b| b.to_vec())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<RelationKey, Vec<Box<[u8]>>>> {
        self.relations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> BufferResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BufferError::io_error(
                "page store rejected write",
                io::Error::new(io::ErrorKind::Other, "injected write failure"),
            ));
        }
        Ok(())
    }
}

impl PageStore for MemoryPageStore {
    fn create_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<()> {
        self.lock().entry((database, object)).or_default();
        Ok(())
    }

    fn drop_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<()> {
        self.lock()
            .remove(&(database, object))
            .map(|_| ())
            .ok_or_else(|| BufferError::object_not_found(database, object))
    }

    fn relation_exists(&self, database: DatabaseId, object: ObjectId) -> bool {
        self.lock().contains_key(&(database, object))
    }

    fn relations(&self, database: DatabaseId) -> BufferResult<Vec<ObjectId>> {
        Ok(self
            .lock()
            .keys()
            .filter(|(db, _)| *db == database)
            .map(|(_, object)| *object)
            .collect())
    }

    fn block_count(&self, database: DatabaseId, object: ObjectId) -> BufferResult<BlockNumber> {
        self.lock()
            .get(&(database, object))
            .map(|blocks| blocks.len() as BlockNumber)
            .ok_or_else(|| BufferError::object_not_found(database, object))
    }

    fn read_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        buf: &mut [u8],
    ) -> BufferResult<()> {
        check_block_len(buf.len())?;
        let relations = self.lock();
        let blocks = relations
            .get(&(database, object))
            .ok_or_else(|| BufferError::object_not_found(database, object))?;
        let page = blocks.get(block as usize).ok_or_else(|| {
            BufferError::io_error_no_source("read past end of relation")
                .at_block(database, object, block)
        })?;
        buf.copy_from_slice(page);
        Ok(())
    }

    fn write_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        data: &[u8],
    ) -> BufferResult<()> {
        check_block_len(data.len())?;
        self.check_writable()
            .map_err(|e| e.at_block(database, object, block))?;

        let mut relations = self.lock();
        let blocks = relations
            .get_mut(&(database, object))
            .ok_or_else(|| BufferError::object_not_found(database, object))?;

        let idx = block as usize;
        if idx < blocks.len() {
            blocks[idx].copy_from_slice(data);
        } else if idx == blocks.len() {
            blocks.push(data.to_vec().into_boxed_slice());
        } else {
            return Err(BufferError::io_error_no_source("write leaves a hole in relation")
                .at_block(database, object, block));
        }
        Ok(())
    }

    fn sync_database(&self, _database: DatabaseId) -> BufferResult<()> {
        self.check_writable()
    }
}
