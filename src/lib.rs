//! hotcold - query-triggered cache warming and eviction
//!
//! For each query, resolve the storage objects its physical plan scans and
//! either load their pages into the shared cache (`hot`), flush and drop the
//! whole database from the cache (`cold`), or do nothing (`off`). Used to
//! benchmark warm-cache against cold-cache query performance reproducibly.
//!
//! - [`plan`]: plan tree walker
//! - [`prewarm`]: warmer and evictor over [`buffer::BufferManager`]
//! - [`control`]: runtime mode, per-query controller, lifecycle hook
//! - [`buffer`]: cache and page store seams with in-process implementations
//! - [`bench`]: workload loader and off/cold/hot benchmark runner

pub mod bench;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod control;
pub mod ids;
pub mod observability;
pub mod plan;
pub mod prewarm;
