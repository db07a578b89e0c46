//! Descriptor tag (ECMA-167 3/7.2)
//!
//! Every UDF descriptor starts with a 16-byte tag carrying its identifier,
//! a checksum over the tag itself, a CRC over the descriptor body and the
//! block the descriptor claims to live at.

use crate::error::{Result, UdfError};
use crate::utils::bytes::{read_u16, read_u32, read_u8};
use crate::utils::checksum::{descriptor_crc, tag_checksum};

/// Tag identifiers (ECMA-167 3/7.2.1 and 4/7.2.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TagIdentifier {
    /// Primary Volume Descriptor
    PrimaryVolume = 1,
    /// Anchor Volume Descriptor Pointer
    AnchorVolumePointer = 2,
    /// Volume Descriptor Pointer
    VolumePointer = 3,
    /// Implementation Use Volume Descriptor
    ImplementationUse = 4,
    /// Partition Descriptor
    Partition = 5,
    /// Logical Volume Descriptor
    LogicalVolume = 6,
    /// Unallocated Space Descriptor
    UnallocatedSpace = 7,
    /// Terminating Descriptor
    Terminating = 8,
    /// Logical Volume Integrity Descriptor
    LogicalVolumeIntegrity = 9,
    /// File Set Descriptor
    FileSet = 256,
    /// File Identifier Descriptor
    FileIdentifier = 257,
    /// Allocation Extent Descriptor
    AllocationExtent = 258,
    /// Indirect Entry
    Indirect = 259,
    /// Terminal Entry
    Terminal = 260,
    /// File Entry
    FileEntry = 261,
    /// Extended Attribute Header Descriptor
    ExtendedAttributeHeader = 262,
    /// Unallocated Space Entry
    UnallocatedSpaceEntry = 263,
    /// Space Bitmap Descriptor
    SpaceBitmap = 264,
    /// Partition Integrity Entry
    PartitionIntegrity = 265,
    /// Extended File Entry
    ExtendedFileEntry = 266,
}

impl TagIdentifier {
    /// Map a raw identifier to a known tag
    pub fn from_u16(value: u16) -> Option<Self> {
        let id = match value {
            1 => Self::PrimaryVolume,
            2 => Self::AnchorVolumePointer,
            3 => Self::VolumePointer,
            4 => Self::ImplementationUse,
            5 => Self::Partition,
            6 => Self::LogicalVolume,
            7 => Self::UnallocatedSpace,
            8 => Self::Terminating,
            9 => Self::LogicalVolumeIntegrity,
            256 => Self::FileSet,
            257 => Self::FileIdentifier,
            258 => Self::AllocationExtent,
            259 => Self::Indirect,
            260 => Self::Terminal,
            261 => Self::FileEntry,
            262 => Self::ExtendedAttributeHeader,
            263 => Self::UnallocatedSpaceEntry,
            264 => Self::SpaceBitmap,
            265 => Self::PartitionIntegrity,
            266 => Self::ExtendedFileEntry,
            _ => return None,
        };
        Some(id)
    }
}

/// Parsed descriptor tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorTag {
    /// Raw tag identifier
    pub identifier: u16,
    /// Descriptor version (2 or 3)
    pub version: u16,
    /// Tag serial number
    pub serial_number: u16,
    /// Descriptor CRC
    pub crc: u16,
    /// Number of bytes after the tag covered by the CRC
    pub crc_length: u16,
    /// Block the descriptor was recorded at
    pub location: u32,
}

impl DescriptorTag {
    /// Tag size in bytes
    pub const SIZE: usize = 16;

    /// Parse and validate a tag at the start of `data`
    ///
    /// Checks the tag checksum, the descriptor CRC (skipped when the CRC
    /// length is zero) and, if `location` is given, the tag location.
    pub fn parse(data: &[u8], location: Option<u32>) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(UdfError::CorruptEntry);
        }

        let checksum = read_u8(data, 4);
        if tag_checksum(&data[..Self::SIZE]) != checksum {
            log::trace!("tag checksum mismatch");
            return Err(UdfError::CorruptEntry);
        }

        if read_u8(data, 5) != 0 {
            log::warn!("descriptor tag with non-zero reserved byte");
        }

        let tag = Self {
            identifier: read_u16(data, 0),
            version: read_u16(data, 2),
            serial_number: read_u16(data, 6),
            crc: read_u16(data, 8),
            crc_length: read_u16(data, 10),
            location: read_u32(data, 12),
        };

        let crc_end = Self::SIZE + tag.crc_length as usize;
        if crc_end > data.len() {
            log::trace!("tag {} CRC length {} exceeds descriptor", tag.identifier, tag.crc_length);
            return Err(UdfError::CorruptEntry);
        }
        if tag.crc_length > 0 && descriptor_crc(&data[Self::SIZE..crc_end]) != tag.crc {
            log::trace!("tag {} CRC mismatch", tag.identifier);
            return Err(UdfError::CorruptEntry);
        }

        if let Some(expected) = location {
            if tag.location != expected {
                log::trace!(
                    "tag {} recorded at {} but read from {}",
                    tag.identifier,
                    tag.location,
                    expected
                );
                return Err(UdfError::CorruptEntry);
            }
        }

        Ok(tag)
    }

    /// Known identifier of this tag
    pub fn kind(&self) -> Option<TagIdentifier> {
        TagIdentifier::from_u16(self.identifier)
    }

    /// Whether this tag carries the given identifier
    pub fn is(&self, id: TagIdentifier) -> bool {
        self.identifier == id as u16
    }
}
