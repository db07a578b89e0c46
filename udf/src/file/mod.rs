//! File location and reading
//!
//! Turns an [`EntryRef`] into physical extents, a [`ResolvedFile`] or the
//! file's bytes.

pub mod entry;
pub mod extent;

pub use entry::{read_file_entry, FileEntry, FileEntryKind};
pub use extent::Extent;

use crate::block::BlockSource;
use crate::descriptor::ad::{AllocationDescriptor, ExtentKind};
use crate::error::{Result, UdfError};
use crate::types::{EntryRef, LbAddr, ResolvedFile, VolumeLayout};
use crate::utils::bytes::sectors_for_bytes;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Locate a file's first data block and size
///
/// For UDF, `start_block` is the physical block of the first recorded
/// extent. Leading holes are skipped. Files with embedded data, or with no
/// recorded extent at all, report the block of their file entry instead.
pub fn resolve<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    entry_ref: &EntryRef,
) -> Result<ResolvedFile> {
    match *entry_ref {
        EntryRef::Iso {
            extent_lba,
            data_length,
        } => Ok(ResolvedFile {
            start_block: extent_lba,
            byte_length: data_length as u64,
        }),
        EntryRef::Udf { icb, .. } => {
            let entry = read_file_entry(source, layout, icb)?;

            let first_recorded = entry
                .allocation_descriptors
                .iter()
                .find(|ad| ad.kind == ExtentKind::Recorded);
            let start_block = match first_recorded {
                Some(ad) if !entry.is_embedded() => {
                    layout.physical_block(ad.location).ok_or(UdfError::CorruptEntry)?
                }
                _ => entry.physical_block,
            };

            Ok(ResolvedFile {
                start_block,
                byte_length: entry.information_length,
            })
        }
    }
}

/// List the physical extents holding a file's data
///
/// Embedded files have no extents. Unallocated extents carry no location
/// and report block 0.
pub fn extents<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    entry_ref: &EntryRef,
) -> Result<Vec<Extent>> {
    match *entry_ref {
        EntryRef::Iso {
            extent_lba,
            data_length,
        } => Ok(alloc::vec![Extent::new(extent_lba, data_length, true)]),
        EntryRef::Udf { icb, .. } => {
            let entry = read_file_entry(source, layout, icb)?;
            entry
                .allocation_descriptors
                .iter()
                .map(|ad| to_extent(layout, ad))
                .collect()
        }
    }
}

fn to_extent(layout: &VolumeLayout, ad: &AllocationDescriptor) -> Result<Extent> {
    if ad.kind == ExtentKind::Unallocated {
        return Ok(Extent::new(0, ad.length, false));
    }

    let start_block = layout.physical_block(ad.location).ok_or(UdfError::CorruptEntry)?;

    // The whole extent must lie inside the partition
    let blocks = sectors_for_bytes(ad.length as u64) as u32;
    if blocks > 1 {
        let last = LbAddr {
            block: ad.location.block.checked_add(blocks - 1).ok_or(UdfError::CorruptEntry)?,
            partition: ad.location.partition,
        };
        layout.physical_block(last).ok_or(UdfError::CorruptEntry)?;
    }

    Ok(Extent::new(start_block, ad.length, ad.kind == ExtentKind::Recorded))
}

/// Read a file's (or directory's) data
///
/// # Arguments
/// * `source` - Block source
/// * `layout` - Volume layout
/// * `entry_ref` - Entry to read
/// * `limit` - Largest size accepted, in bytes
///
/// # Returns
/// Exactly information-length bytes. Unrecorded extents read as zeros.
pub fn read_data<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    entry_ref: &EntryRef,
    limit: Option<u64>,
) -> Result<Vec<u8>> {
    match *entry_ref {
        EntryRef::Iso {
            extent_lba,
            data_length,
        } => {
            check_limit(data_length as u64, limit)?;
            let mut data = Vec::new();
            source.read_blocks_into(extent_lba, sectors_for_bytes(data_length as u64) as u32, &mut data)?;
            data.truncate(data_length as usize);
            Ok(data)
        }
        EntryRef::Udf { icb, .. } => {
            let entry = read_file_entry(source, layout, icb)?;
            read_entry_data(source, layout, entry, limit)
        }
    }
}

/// Read the data described by an already parsed UDF file entry
pub fn read_entry_data<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    entry: FileEntry,
    limit: Option<u64>,
) -> Result<Vec<u8>> {
    check_limit(entry.information_length, limit)?;

    if entry.is_embedded() {
        return Ok(entry.embedded_data);
    }

    let mut remaining = entry.information_length;
    let mut data = Vec::new();
    for ad in &entry.allocation_descriptors {
        if remaining == 0 {
            break;
        }

        let extent = to_extent(layout, ad)?;
        let take = remaining.min(extent.length as u64);
        let before = data.len();

        if extent.recorded {
            let blocks = sectors_for_bytes(take) as u32;
            source.read_blocks_into(extent.start_block, blocks, &mut data)?;
            data.truncate(before + take as usize);
        } else {
            data.resize(before + take as usize, 0);
        }
        remaining -= take;
    }

    if remaining != 0 {
        log::debug!(
            "entry at {:?} is {} bytes short of its information length",
            entry.location,
            remaining
        );
        return Err(UdfError::CorruptEntry);
    }

    Ok(data)
}

fn check_limit(length: u64, limit: Option<u64>) -> Result<()> {
    match limit {
        Some(max) if length > max => {
            log::debug!("entry of {} bytes exceeds limit of {}", length, max);
            Err(UdfError::CorruptEntry)
        }
        _ => Ok(()),
    }
}
