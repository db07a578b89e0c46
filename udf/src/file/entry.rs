//! (Extended) File Entry parsing (ECMA-167 4/14.9 and 4/14.17)

use crate::block::BlockSource;
use crate::descriptor::ad::{decode_ads, AdForm, AllocationDescriptor, ExtentKind};
use crate::descriptor::{read_tagged, DescriptorTag, TagIdentifier};
use crate::error::{Result, UdfError};
use crate::types::{LbAddr, VolumeLayout, MAX_CHAIN_HOPS, SECTOR_SIZE};
use crate::utils::bytes::{read_u16, read_u32, read_u64, read_u8};
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// ICB file type: directory (ECMA-167 4/14.6.6)
pub const FILE_TYPE_DIRECTORY: u8 = 4;

/// Which of the two file entry layouts was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEntryKind {
    /// File Entry (tag 261)
    Standard,
    /// Extended File Entry (tag 266)
    Extended,
}

impl FileEntryKind {
    /// Offsets of (L_EA, L_AD, extended attributes start)
    fn layout(&self) -> (usize, usize, usize) {
        match self {
            Self::Standard => (168, 172, 176),
            Self::Extended => (208, 212, 216),
        }
    }
}

/// File entry with its allocation descriptors resolved
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Standard or extended entry
    pub kind: FileEntryKind,

    /// ICB file type
    pub file_type: u8,

    /// File size in bytes
    pub information_length: u64,

    /// Allocation descriptor form
    pub ad_form: AdForm,

    /// Partition-relative location of this entry
    pub location: LbAddr,

    /// Physical block holding this entry
    pub physical_block: u32,

    /// Data extents, continuation extents already followed
    pub allocation_descriptors: Vec<AllocationDescriptor>,

    /// File data when recorded inside the entry
    pub embedded_data: Vec<u8>,
}

impl FileEntry {
    /// Parse a file entry from its block
    ///
    /// The tag must already have been validated.
    pub fn parse(data: &[u8], tag: &DescriptorTag, location: LbAddr, physical_block: u32) -> Result<Self> {
        let kind = match tag.kind() {
            Some(TagIdentifier::FileEntry) => FileEntryKind::Standard,
            Some(TagIdentifier::ExtendedFileEntry) => FileEntryKind::Extended,
            _ => {
                log::trace!("expected file entry at {}, found tag {}", physical_block, tag.identifier);
                return Err(UdfError::CorruptEntry);
            }
        };

        // ICB tag starts at byte 16
        let file_type = read_u8(data, 27);
        let flags = read_u16(data, 34);
        let ad_form = AdForm::from_icb_flags(flags).ok_or(UdfError::CorruptEntry)?;
        let information_length = read_u64(data, 56);

        let (l_ea_offset, l_ad_offset, base) = kind.layout();
        let l_ea = read_u32(data, l_ea_offset) as usize;
        let l_ad = read_u32(data, l_ad_offset) as usize;
        let ad_start = base.checked_add(l_ea).ok_or(UdfError::CorruptEntry)?;
        let ad_end = ad_start.checked_add(l_ad).ok_or(UdfError::CorruptEntry)?;
        if ad_end > SECTOR_SIZE || ad_end > data.len() {
            return Err(UdfError::CorruptEntry);
        }
        let area = &data[ad_start..ad_end];

        let (allocation_descriptors, embedded_data) = match ad_form {
            AdForm::Embedded => {
                if information_length > l_ad as u64 {
                    return Err(UdfError::CorruptEntry);
                }
                (Vec::new(), area[..information_length as usize].to_vec())
            }
            form => (decode_ads(area, form, location.partition), Vec::new()),
        };

        Ok(Self {
            kind,
            file_type,
            information_length,
            ad_form,
            location,
            physical_block,
            allocation_descriptors,
            embedded_data,
        })
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.file_type == FILE_TYPE_DIRECTORY
    }

    /// Is the data embedded in the entry?
    pub fn is_embedded(&self) -> bool {
        self.ad_form == AdForm::Embedded
    }
}

/// Read and parse the file entry at `icb`, following continuation extents
pub fn read_file_entry<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    icb: LbAddr,
) -> Result<FileEntry> {
    let mut buffer = [0u8; SECTOR_SIZE];

    let physical = layout.physical_block(icb).ok_or(UdfError::CorruptEntry)?;
    let tag = read_tagged(source, physical, icb.block, &mut buffer)?;
    let mut entry = FileEntry::parse(&buffer, &tag, icb, physical)?;

    let mut hops = 0;
    while let Some(pos) = entry
        .allocation_descriptors
        .iter()
        .position(|ad| ad.kind == ExtentKind::Continuation)
    {
        hops += 1;
        if hops > MAX_CHAIN_HOPS {
            return Err(UdfError::CorruptEntry);
        }

        let next = entry.allocation_descriptors[pos].location;
        entry.allocation_descriptors.truncate(pos);

        let physical = layout.physical_block(next).ok_or(UdfError::CorruptEntry)?;
        let tag = read_tagged(source, physical, next.block, &mut buffer)?;
        if !tag.is(TagIdentifier::AllocationExtent) {
            return Err(UdfError::CorruptEntry);
        }

        // Allocation Extent Descriptor (4/14.5): tag, previous AED, L_AD
        let l_ad = read_u32(&buffer, 20) as usize;
        let end = 24usize.checked_add(l_ad).ok_or(UdfError::CorruptEntry)?;
        if end > SECTOR_SIZE {
            return Err(UdfError::CorruptEntry);
        }
        log::trace!("following allocation extent at {:?}", next);
        entry
            .allocation_descriptors
            .extend(decode_ads(&buffer[24..end], entry.ad_form, next.partition));
    }

    Ok(entry)
}
