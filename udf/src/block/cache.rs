//! Read-through block cache
//!
//! The medium is treated as immutable for the lifetime of a lookup, so
//! entries are never invalidated. Once full, new blocks are simply not
//! cached.

use crate::types::SECTOR_SIZE;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;

/// Maximum number of cached blocks
pub const CACHE_CAPACITY: usize = 64;

/// Cache of recently read blocks keyed by logical block number
#[derive(Default)]
pub struct BlockCache {
    blocks: BTreeMap<u32, Box<[u8; SECTOR_SIZE]>>,
}

impl BlockCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a block
    pub fn get(&self, lbn: u32) -> Option<&[u8; SECTOR_SIZE]> {
        self.blocks.get(&lbn).map(|b| b.as_ref())
    }

    /// Remember a block if there is room
    pub fn insert(&mut self, lbn: u32, data: &[u8; SECTOR_SIZE]) {
        if self.blocks.len() < CACHE_CAPACITY {
            self.blocks.insert(lbn, Box::new(*data));
        }
    }

    /// Number of cached blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
