//! Warm and evict engine
//!
//! [`CacheWarmer`] pulls relations into the shared cache block by block.
//! [`CacheEvictor`] flushes and then drops a whole database from it. Both
//! only call [`crate::buffer::BufferManager`] and hold no state between calls.

mod evictor;
mod warmer;

pub use evictor::{CacheEvictor, EvictionStats};
pub use warmer::{CacheWarmer, WarmOutcome, WarmReport};
