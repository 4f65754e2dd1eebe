//! Shared page cache subsystem
//!
//! The prewarm and evict paths only ever talk to [`BufferManager`]. The host
//! engine's cache implements it in production; [`SharedBufferPool`] over a
//! [`PageStore`] implements it in-process for tests and benchmarks.
//!
//! # Guarantees relied on by callers
//!
//! - `read_buffer` is the same read path ordinary scans use
//! - a flush makes pages durable before reporting them clean
//! - a drop never discards a dirty or pinned page

mod errors;
mod file_store;
mod manager;
mod pool;
mod store;

pub use errors::{BufferError, BufferErrorCode, BufferResult};
pub use file_store::FilePageStore;
pub use manager::{BufferManager, BufferTag, RelationHandle};
pub use pool::{BufferStats, SharedBufferPool};
pub use store::{MemoryPageStore, PageStore};
