//! ECMA-167 descriptor primitives
//!
//! Tags, extent and allocation descriptors shared by the volume, directory
//! and file layers.

pub mod ad;
pub mod tag;

pub use ad::{AdForm, AllocationDescriptor, ExtentAd, ExtentKind, LongAd};
pub use tag::{DescriptorTag, TagIdentifier};

use crate::block::BlockSource;
use crate::error::Result;
use crate::types::SECTOR_SIZE;
use gpt_disk_io::BlockIo;

/// Read one block and validate the descriptor tag at its start
///
/// `location` is the value the tag location field must carry: the absolute
/// block for volume structures, the partition-relative block for file
/// structures.
pub fn read_tagged<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    block: u32,
    location: u32,
    buffer: &mut [u8; SECTOR_SIZE],
) -> Result<DescriptorTag> {
    source.read_block(block, buffer)?;
    DescriptorTag::parse(buffer, Some(location))
}
