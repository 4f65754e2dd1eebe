//! Shared buffer pool
//!
//! A fixed number of page frames over a [`PageStore`]. On a miss the page is
//! read from the store into a free frame, or into the least recently used
//! unpinned frame, which is written back first if dirty.
//!
//! All state sits behind one mutex and I/O happens under it. Concurrent
//! callers are serialized; none of them observes a half-admitted page.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::errors::{BufferError, BufferResult};
use super::manager::{BufferManager, BufferTag, RelationHandle};
use super::store::PageStore;
use crate::ids::{BlockNumber, DatabaseId, ObjectId, BLOCK_SIZE};

/// Access counters, comparable to EXPLAIN (BUFFERS) shared hit/read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    /// Page found in a frame
    pub hits: u64,
    /// Page read from the store
    pub reads: u64,
    /// Page written back to the store
    pub writes: u64,
    /// Frame reused for a different page
    pub evictions: u64,
}

impl BufferStats {
    /// Counter deltas since `earlier`
    pub fn since(&self, earlier: &BufferStats) -> BufferStats {
        BufferStats {
            hits: self.hits - earlier.hits,
            reads: self.reads - earlier.reads,
            writes: self.writes - earlier.writes,
            evictions: self.evictions - earlier.evictions,
        }
    }
}

#[derive(Debug)]
struct Frame {
    data: Box<[u8]>,
    dirty: bool,
    pins: u32,
    last_used: u64,
}

#[derive(Debug, Default)]
struct PoolState {
    frames: HashMap<BufferTag, Frame>,
    tick: u64,
    locks: HashMap<(DatabaseId, ObjectId), u32>,
    stats: BufferStats,
}

/// In-process shared page cache
pub struct SharedBufferPool {
    store: Arc<dyn PageStore>,
    capacity: usize,
    state: Mutex<PoolState>,
}

impl SharedBufferPool {
    /// Creates an empty pool of `capacity` frames over `store`
    pub fn new(store: Arc<dyn PageStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn stats(&self) -> BufferStats {
        self.lock().stats
    }

    pub fn is_cached(&self, tag: BufferTag) -> bool {
        self.lock().frames.contains_key(&tag)
    }

    /// Number of cached pages belonging to the database
    pub fn cached_pages(&self, database: DatabaseId) -> usize {
        self.lock()
            .frames
            .keys()
            .filter(|tag| tag.database == database)
            .count()
    }

    /// Number of dirty cached pages belonging to the database
    pub fn dirty_pages(&self, database: DatabaseId) -> usize {
        self.lock()
            .frames
            .iter()
            .filter(|(tag, frame)| tag.database == database && frame.dirty)
            .count()
    }

    /// Number of frames currently pinned by anyone
    pub fn pinned_pages(&self) -> usize {
        self.lock().frames.values().filter(|f| f.pins > 0).count()
    }

    /// Number of relations currently held open
    pub fn open_relations(&self) -> usize {
        self.lock().locks.len()
    }

    /// Copy of a cached page, `None` if not cached
    pub fn page_contents(&self, tag: BufferTag) -> Option<Vec<u8>> {
        self.lock().frames.get(&tag).map(|f| f.data.to_vec())
    }

    /// Overwrites an existing block through the cache and marks it dirty.
    ///
    /// The page is admitted if not cached; nothing reaches the store until
    /// the page is flushed or its frame is reused.
    pub fn write_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        data: &[u8],
    ) -> BufferResult<()> {
        if data.len() != BLOCK_SIZE {
            return Err(BufferError::io_error_no_source(format!(
                "block buffer is {} bytes, expected {}",
                data.len(),
                BLOCK_SIZE
            )));
        }

        let tag = BufferTag::new(database, object, block);
        let mut state = self.lock();
        self.pin(&mut state, tag)?;

        if let Some(frame) = state.frames.get_mut(&tag) {
            frame.data.copy_from_slice(data);
            frame.dirty = true;
            frame.pins -= 1;
        }
        Ok(())
    }

    /// Forgets every cached page of a dropped relation.
    ///
    /// Unpinned frames are freed without write-back. Pinned frames stay until
    /// their holder releases them but are no longer dirty, so a later flush
    /// never tries to write them. Returns the number of frames freed.
    pub fn discard_relation_buffers(&self, database: DatabaseId, object: ObjectId) -> u64 {
        let mut state = self.lock();
        Self::discard_relation(&mut state, database, object)
    }

    fn discard_relation(state: &mut PoolState, database: DatabaseId, object: ObjectId) -> u64 {
        let before = state.frames.len();
        state.frames.retain(|tag, frame| {
            if tag.database != database || tag.object != object {
                return true;
            }
            frame.dirty = false;
            frame.pins > 0
        });
        (before - state.frames.len()) as u64
    }

    /// Discards cached pages of relations the store no longer has
    fn discard_dropped(&self, state: &mut PoolState, database: DatabaseId) {
        let mut objects: Vec<ObjectId> = state
            .frames
            .keys()
            .filter(|tag| tag.database == database)
            .map(|tag| tag.object)
            .collect();
        objects.sort();
        objects.dedup();

        for object in objects {
            if !self.store.relation_exists(database, object) {
                Self::discard_relation(state, database, object);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pins `tag`, admitting it from the store on a miss
    fn pin(&self, state: &mut PoolState, tag: BufferTag) -> BufferResult<()> {
        state.tick += 1;
        let tick = state.tick;

        if let Some(frame) = state.frames.get_mut(&tag) {
            frame.pins += 1;
            frame.last_used = tick;
            state.stats.hits += 1;
            return Ok(());
        }

        if state.frames.len() >= self.capacity {
            self.evict_one(state)?;
        }

        let mut data = vec![0u8; BLOCK_SIZE].into_boxed_slice();
        self.store
            .read_block(tag.database, tag.object, tag.block, &mut data)?;

        state.stats.reads += 1;
        state.frames.insert(
            tag,
            Frame {
                data,
                dirty: false,
                pins: 1,
                last_used: tick,
            },
        );
        Ok(())
    }

    /// Frees the least recently used unpinned frame
    fn evict_one(&self, state: &mut PoolState) -> BufferResult<()> {
        let victim = state
            .frames
            .iter()
            .filter(|(_, f)| f.pins == 0)
            .min_by_key(|(_, f)| f.last_used)
            .map(|(tag, _)| *tag)
            .ok_or_else(|| BufferError::no_free_buffer(self.capacity))?;

        if let Some(frame) = state.frames.get(&victim) {
            // A dropped relation's page has nowhere to go
            if frame.dirty && self.store.relation_exists(victim.database, victim.object) {
                self.store
                    .write_block(victim.database, victim.object, victim.block, &frame.data)?;
                state.stats.writes += 1;
            }
        }

        state.frames.remove(&victim);
        state.stats.evictions += 1;
        Ok(())
    }
}

impl BufferManager for SharedBufferPool {
    fn open_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<RelationHandle> {
        if !self.store.relation_exists(database, object) {
            return Err(BufferError::object_not_found(database, object));
        }
        *self.lock().locks.entry((database, object)).or_insert(0) += 1;
        Ok(RelationHandle::new(database, object))
    }

    fn close_relation(&self, relation: RelationHandle) {
        let key = (relation.database(), relation.object());
        let mut state = self.lock();
        if let Some(count) = state.locks.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                state.locks.remove(&key);
            }
        }
    }

    fn block_count(&self, relation: &RelationHandle) -> BufferResult<BlockNumber> {
        self.store.block_count(relation.database(), relation.object())
    }

    fn read_buffer(&self, relation: &RelationHandle, block: BlockNumber) -> BufferResult<BufferTag> {
        let tag = BufferTag::new(relation.database(), relation.object(), block);
        let mut state = self.lock();
        self.pin(&mut state, tag)?;
        Ok(tag)
    }

    fn release_buffer(&self, buffer: BufferTag) {
        if let Some(frame) = self.lock().frames.get_mut(&buffer) {
            frame.pins = frame.pins.saturating_sub(1);
        }
    }

    fn flush_database_buffers(&self, database: DatabaseId) -> BufferResult<u64> {
        let mut state = self.lock();
        self.discard_dropped(&mut state, database);

        let mut dirty: Vec<BufferTag> = state
            .frames
            .iter()
            .filter(|(tag, frame)| tag.database == database && frame.dirty)
            .map(|(tag, _)| *tag)
            .collect();
        dirty.sort();

        if dirty.is_empty() {
            return Ok(0);
        }

        for tag in &dirty {
            if let Some(frame) = state.frames.get(tag) {
                self.store
                    .write_block(tag.database, tag.object, tag.block, &frame.data)
                    .map_err(BufferError::into_host_io)?;
            }
        }
        self.store
            .sync_database(database)
            .map_err(BufferError::into_host_io)?;

        // Clean only once the writes are durable
        for tag in &dirty {
            if let Some(frame) = state.frames.get_mut(tag) {
                frame.dirty = false;
            }
        }
        state.stats.writes += dirty.len() as u64;

        Ok(dirty.len() as u64)
    }

    fn drop_database_buffers(&self, database: DatabaseId) -> u64 {
        let mut state = self.lock();
        let before = state.frames.len();
        state
            .frames
            .retain(|tag, frame| tag.database != database || frame.dirty || frame.pins > 0);
        (before - state.frames.len()) as u64
    }
}
