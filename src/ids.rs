//! Storage object identities
//!
//! Object and database identifiers are opaque unsigned integers handed out by
//! the host catalog. They carry no behavior beyond construction, access and
//! display; nothing in this crate allocates them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Block number within a relation fork. Blocks are numbered from zero.
pub type BlockNumber = u32;

/// Size in bytes of one storage page.
pub const BLOCK_SIZE: usize = 8192;

/// Opaque identifier naming a table or index within a database.
///
/// The same object may appear many times in a resolved plan; identity
/// comparison is the only meaningful operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier naming a database. Eviction scope is always one database.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(u32);

impl DatabaseId {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
