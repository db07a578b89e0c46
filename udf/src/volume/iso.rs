//! ISO9660 volume descriptor set scanning

use super::primary::{self, VolumeDescriptorHeader, VolumeDescriptorType};
use crate::block::BlockSource;
use crate::directory::record::DirectoryRecord;
use crate::error::{Result, UdfError};
use crate::types::{
    EntryRef, VolumeFormat, VolumeLayout, MAX_VOLUME_DESCRIPTORS, SECTOR_SIZE,
    VOLUME_DESCRIPTOR_START,
};
use gpt_disk_io::BlockIo;

/// Scan the ISO9660 volume descriptor set
///
/// Reads volume descriptors starting at sector 16 until the set terminator
/// and builds the layout from the Primary Volume Descriptor.
pub fn scan<B: BlockIo>(source: &mut BlockSource<'_, B>) -> Result<VolumeLayout> {
    let mut buffer = [0u8; SECTOR_SIZE];
    let mut layout: Option<VolumeLayout> = None;

    for sector in VOLUME_DESCRIPTOR_START..VOLUME_DESCRIPTOR_START + MAX_VOLUME_DESCRIPTORS {
        match source.read_block(sector, &mut buffer) {
            Ok(()) => {}
            Err(UdfError::OutOfRange) => return Err(UdfError::UnsupportedFormat),
            Err(e) => return Err(e),
        }

        let header = VolumeDescriptorHeader::parse(&buffer);
        if !header.validate() {
            log::trace!("sector {} is not an ISO9660 volume descriptor", sector);
            return Err(UdfError::UnsupportedFormat);
        }

        match header.type_code {
            t if t == VolumeDescriptorType::Primary as u8 => {
                // First primary descriptor wins
                if layout.is_none() {
                    layout = Some(layout_from_primary(&buffer)?);
                }
            }
            t if t == VolumeDescriptorType::Terminator as u8 => break,
            _ => {
                // Boot records, Joliet and partition descriptors are not needed
            }
        }
    }

    layout.ok_or(UdfError::UnsupportedFormat)
}

fn layout_from_primary(sector: &[u8]) -> Result<VolumeLayout> {
    let pvd = primary::parse(sector)?;
    if pvd.logical_block_size as usize != SECTOR_SIZE {
        log::debug!("unsupported ISO9660 block size {}", pvd.logical_block_size);
        return Err(UdfError::UnsupportedFormat);
    }

    let root = DirectoryRecord::parse(&pvd.root_directory_record)
        .map_err(|_| UdfError::UnsupportedFormat)?;

    Ok(VolumeLayout {
        format: VolumeFormat::Iso9660,
        partition_start_block: 0,
        partition_length_blocks: pvd.volume_space_size,
        partition_ref: 0,
        root_entry_ref: EntryRef::Iso {
            extent_lba: root.data_lba(),
            data_length: root.data_length,
        },
    })
}
