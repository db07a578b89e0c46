//! File extent management
//!
//! Extents represent contiguous data regions on disc.

use crate::types::SECTOR_SIZE;

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting physical block
    pub start_block: u32,

    /// Length in bytes
    pub length: u32,

    /// Whether data is recorded (unrecorded extents read as zeros)
    pub recorded: bool,
}

impl Extent {
    /// Create new extent
    pub fn new(start_block: u32, length: u32, recorded: bool) -> Self {
        Self {
            start_block,
            length,
            recorded,
        }
    }

    /// Number of sectors (2048 bytes each)
    pub fn sector_count(&self) -> u32 {
        self.length.div_ceil(SECTOR_SIZE as u32)
    }

    /// End block (exclusive)
    pub fn end_block(&self) -> u32 {
        self.start_block.saturating_add(self.sector_count())
    }
}
