//! Extent and allocation descriptors (ECMA-167 3/7.1, 4/14.14)

use crate::types::LbAddr;
use crate::utils::bytes::{read_u16, read_u32};
use alloc::vec::Vec;

/// Mask selecting the extent length bits of an allocation descriptor
pub const EXTENT_LENGTH_MASK: u32 = 0x3FFF_FFFF;

/// Extent descriptor (ECMA-167 3/7.1), absolute location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtentAd {
    /// Extent length in bytes
    pub length: u32,
    /// Extent location (absolute sector)
    pub location: u32,
}

impl ExtentAd {
    /// Encoded size
    pub const SIZE: usize = 8;

    /// Parse from the start of `data`
    pub fn parse(data: &[u8]) -> Self {
        Self {
            length: read_u32(data, 0),
            location: read_u32(data, 4),
        }
    }

    /// Number of whole sectors covered
    pub fn sector_count(&self) -> u32 {
        self.length / crate::types::SECTOR_SIZE as u32
    }
}

/// Long allocation descriptor (ECMA-167 4/14.14.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongAd {
    /// Extent length, type bits included
    pub length: u32,
    /// Extent location
    pub location: LbAddr,
}

impl LongAd {
    /// Encoded size
    pub const SIZE: usize = 16;

    /// Parse from the start of `data`
    pub fn parse(data: &[u8]) -> Self {
        Self {
            length: read_u32(data, 0),
            location: LbAddr {
                block: read_u32(data, 4),
                partition: read_u16(data, 8),
            },
        }
    }
}

/// Extent type stored in the top two bits of the length (ECMA-167 4/14.14.1.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentKind {
    /// Recorded and allocated
    Recorded,
    /// Allocated but not recorded (reads as zeros)
    AllocatedUnrecorded,
    /// Neither allocated nor recorded (reads as zeros)
    Unallocated,
    /// Points at the next Allocation Extent Descriptor
    Continuation,
}

impl ExtentKind {
    /// Decode from a raw extent length
    pub fn from_length(raw: u32) -> Self {
        match raw >> 30 {
            0 => Self::Recorded,
            1 => Self::AllocatedUnrecorded,
            2 => Self::Unallocated,
            _ => Self::Continuation,
        }
    }
}

/// Form of allocation descriptors in a file entry (ICB tag flags bits 0-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdForm {
    /// Short allocation descriptors (8 bytes)
    Short,
    /// Long allocation descriptors (16 bytes)
    Long,
    /// Extended allocation descriptors (20 bytes)
    Extended,
    /// File data is embedded in the allocation descriptor area
    Embedded,
}

impl AdForm {
    /// Decode from ICB tag flags
    pub fn from_icb_flags(flags: u16) -> Option<Self> {
        match flags & 0x7 {
            0 => Some(Self::Short),
            1 => Some(Self::Long),
            2 => Some(Self::Extended),
            3 => Some(Self::Embedded),
            _ => None,
        }
    }

    /// Encoded descriptor size (0 for embedded data)
    pub fn size(&self) -> usize {
        match self {
            Self::Short => 8,
            Self::Long => 16,
            Self::Extended => 20,
            Self::Embedded => 0,
        }
    }
}

/// Decoded allocation descriptor of any form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationDescriptor {
    /// Extent type
    pub kind: ExtentKind,
    /// Extent length in bytes, type bits removed
    pub length: u32,
    /// Extent location
    pub location: LbAddr,
}

/// Decode allocation descriptors from an allocation descriptor area
///
/// Short descriptors inherit `partition` from the entry holding them. The
/// list ends at the first zero extent length or at the end of the area.
pub fn decode_ads(area: &[u8], form: AdForm, partition: u16) -> Vec<AllocationDescriptor> {
    let size = form.size();
    if size == 0 {
        return Vec::new();
    }

    let mut ads = Vec::new();
    for raw in area.chunks_exact(size) {
        let raw_length = read_u32(raw, 0);
        let length = raw_length & EXTENT_LENGTH_MASK;
        if length == 0 {
            break;
        }

        let location = match form {
            AdForm::Short => LbAddr {
                block: read_u32(raw, 4),
                partition,
            },
            AdForm::Long => LongAd::parse(raw).location,
            AdForm::Extended => LbAddr {
                block: read_u32(raw, 12),
                partition: read_u16(raw, 16),
            },
            AdForm::Embedded => break,
        };

        ads.push(AllocationDescriptor {
            kind: ExtentKind::from_length(raw_length),
            length,
            location,
        });
    }
    ads
}
