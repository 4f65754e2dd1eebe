//! Cache evictor
//!
//! Evicts a whole database from the shared cache: flush first, then drop.
//! A drop without a completed flush could discard the only copy of a dirty
//! page, so a flush failure ends the eviction before anything is dropped.
//!
//! The scope is the database, not the query's footprint. Every session on
//! the database loses its cached pages.

use serde::Serialize;

use crate::buffer::{BufferManager, BufferResult};
use crate::ids::DatabaseId;
use crate::observability::ObservationScope;

/// Pages written back and pages discarded by one eviction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvictionStats {
    pub flushed: u64,
    pub dropped: u64,
}

/// Flushes and drops a database's cached pages
pub struct CacheEvictor<'a, B: BufferManager + ?Sized> {
    buffers: &'a B,
}

impl<'a, B: BufferManager + ?Sized> CacheEvictor<'a, B> {
    pub fn new(buffers: &'a B) -> Self {
        Self { buffers }
    }

    /// Flushes every dirty page of `database`, then drops its cached pages.
    ///
    /// Evicting an already cold database returns `(0, 0)`.
    ///
    /// # Errors
    ///
    /// `HC_HOST_IO_ERROR` if the flush fails. The drop step is not run and
    /// the eviction is not retried.
    pub fn evict_database(&self, database: DatabaseId) -> BufferResult<EvictionStats> {
        let scope = ObservationScope::new("EVICT", &[("database", database.to_string())]);

        let flushed = match self.buffers.flush_database_buffers(database) {
            Ok(flushed) => flushed,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };

        let dropped = self.buffers.drop_database_buffers(database);

        scope.complete(&[
            ("dropped", dropped.to_string()),
            ("flushed", flushed.to_string()),
        ]);
        Ok(EvictionStats { flushed, dropped })
    }
}
