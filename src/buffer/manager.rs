//! Shared page cache interface
//!
//! This is the surface the prewarm and evict paths call. It mirrors the
//! host buffer manager: relations are opened under a shared lock, pages are
//! fetched through the normal read path (pinning them), and every pin is
//! released by the caller.

use serde::Serialize;

use super::errors::BufferResult;
use crate::ids::{BlockNumber, DatabaseId, ObjectId};

/// A relation opened for shared read. Must be handed back to
/// [`BufferManager::close_relation`].
#[derive(Debug, PartialEq, Eq)]
pub struct RelationHandle {
    database: DatabaseId,
    object: ObjectId,
}

impl RelationHandle {
    /// Only buffer managers mint handles
    pub fn new(database: DatabaseId, object: ObjectId) -> Self {
        Self { database, object }
    }

    pub fn database(&self) -> DatabaseId {
        self.database
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }
}

/// Identity of one cached page. Returned pinned by `read_buffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BufferTag {
    pub database: DatabaseId,
    pub object: ObjectId,
    pub block: BlockNumber,
}

impl BufferTag {
    pub fn new(database: DatabaseId, object: ObjectId, block: BlockNumber) -> Self {
        Self {
            database,
            object,
            block,
        }
    }
}

/// The host's shared page cache.
///
/// The cache is process-wide: flushing or dropping a database's pages
/// affects every session using that database.
pub trait BufferManager {
    /// Opens a relation for shared (non-exclusive) read.
    ///
    /// # Errors
    ///
    /// `HC_OBJECT_NOT_FOUND` if the relation does not exist.
    fn open_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<RelationHandle>;

    /// Releases the shared lock taken by `open_relation`
    fn close_relation(&self, relation: RelationHandle);

    /// Current relation length in blocks
    fn block_count(&self, relation: &RelationHandle) -> BufferResult<BlockNumber>;

    /// Fetches a page through the normal read path and pins it
    fn read_buffer(&self, relation: &RelationHandle, block: BlockNumber) -> BufferResult<BufferTag>;

    /// Unpins a page returned by `read_buffer`
    fn release_buffer(&self, buffer: BufferTag);

    /// Writes every dirty cached page of the database to durable storage.
    ///
    /// Returns the number of pages written. On error, nothing is reported
    /// clean that was not made durable.
    fn flush_database_buffers(&self, database: DatabaseId) -> BufferResult<u64>;

    /// Discards the database's cached pages and returns how many were dropped.
    ///
    /// Dirty or pinned pages are never discarded.
    fn drop_database_buffers(&self, database: DatabaseId) -> u64;
}
