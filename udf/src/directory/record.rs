//! ISO9660 Directory Record structure
//!
//! Directory records describe files and subdirectories (ECMA-119 9.1).

use crate::error::{Result, UdfError};
use crate::utils::bytes::{read_u32, read_u8};

/// Directory record flag: entry is a directory
pub const FLAG_DIRECTORY: u8 = 0x02;

/// Directory record flag: not the final record of a multi-extent file
pub const FLAG_MULTI_EXTENT: u8 = 0x80;

/// Directory Record (variable length), borrowed from a sector
#[derive(Debug, Clone, Copy)]
pub struct DirectoryRecord<'a> {
    /// Length of directory record (BP 1)
    pub length: u8,

    /// Extended attribute record length (BP 2)
    pub extended_attr_length: u8,

    /// Extent location (BP 3-10, little-endian half)
    pub extent_lba: u32,

    /// Data length (BP 11-18, little-endian half)
    pub data_length: u32,

    /// File flags (BP 26)
    pub file_flags: u8,

    /// File identifier (BP 34 onwards)
    pub identifier: &'a [u8],
}

impl<'a> DirectoryRecord<'a> {
    /// Fixed part of a record, up to and including the identifier length
    pub const FIXED_LENGTH: usize = 33;

    /// Parse directory record from bytes
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < Self::FIXED_LENGTH {
            return Err(UdfError::CorruptEntry);
        }

        let length = data[0];
        if length == 0 || length as usize > data.len() {
            return Err(UdfError::CorruptEntry);
        }

        let id_len = read_u8(data, 32) as usize;
        if Self::FIXED_LENGTH + id_len > length as usize {
            return Err(UdfError::CorruptEntry);
        }

        Ok(Self {
            length,
            extended_attr_length: data[1],
            extent_lba: read_u32(data, 2),
            data_length: read_u32(data, 10),
            file_flags: data[25],
            identifier: &data[Self::FIXED_LENGTH..Self::FIXED_LENGTH + id_len],
        })
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.file_flags & FLAG_DIRECTORY != 0
    }

    /// Is this the "." or ".." record?
    pub fn is_self_or_parent(&self) -> bool {
        self.identifier.len() == 1 && (self.identifier[0] == 0x00 || self.identifier[0] == 0x01)
    }

    /// Does the file continue in the next record?
    pub fn is_multi_extent(&self) -> bool {
        self.file_flags & FLAG_MULTI_EXTENT != 0
    }

    /// First data block, skipping the extended attribute record
    pub fn data_lba(&self) -> u32 {
        self.extent_lba + self.extended_attr_length as u32
    }
}
