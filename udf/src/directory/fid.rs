//! File Identifier Descriptor (ECMA-167 4/14.4)
//!
//! UDF directories are a byte stream of File Identifier Descriptors, each
//! naming one child and pointing at its ICB. Descriptors are padded to a
//! multiple of four bytes and may straddle block boundaries, so they are
//! parsed from the directory's whole data rather than per block.

use crate::descriptor::{DescriptorTag, LongAd, TagIdentifier};
use crate::error::{Result, UdfError};
use crate::utils::bytes::{read_u16, read_u8};
use crate::utils::string;
use alloc::string::String;

/// File characteristics: directory
pub const CHAR_DIRECTORY: u8 = 0x02;
/// File characteristics: deleted
pub const CHAR_DELETED: u8 = 0x04;
/// File characteristics: parent directory
pub const CHAR_PARENT: u8 = 0x08;

/// File Identifier Descriptor borrowed from directory data
#[derive(Debug, Clone, Copy)]
pub struct FileIdentifier<'a> {
    /// File characteristics flags
    pub characteristics: u8,
    /// ICB of the named file or directory
    pub icb: LongAd,
    /// Raw CS0 identifier (compression ID first), empty for the parent entry
    pub identifier: &'a [u8],
    /// Total descriptor length including padding
    pub length: usize,
}

impl<'a> FileIdentifier<'a> {
    /// Fixed part of the descriptor
    pub const FIXED_LENGTH: usize = 38;

    /// Parse and validate a descriptor at the start of `data`
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < Self::FIXED_LENGTH {
            return Err(UdfError::CorruptEntry);
        }

        let tag = DescriptorTag::parse(data, None)?;
        if !tag.is(TagIdentifier::FileIdentifier) {
            log::trace!("expected file identifier, found tag {}", tag.identifier);
            return Err(UdfError::CorruptEntry);
        }

        let id_len = read_u8(data, 19) as usize;
        let impl_use_len = read_u16(data, 36) as usize;
        let id_start = Self::FIXED_LENGTH + impl_use_len;
        let id_end = id_start + id_len;
        let length = (id_end + 3) & !3;
        if id_end > data.len() {
            return Err(UdfError::CorruptEntry);
        }

        Ok(Self {
            characteristics: read_u8(data, 18),
            icb: LongAd::parse(&data[20..]),
            identifier: &data[id_start..id_end],
            length,
        })
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.characteristics & CHAR_DIRECTORY != 0
    }

    /// Is this entry deleted?
    pub fn is_deleted(&self) -> bool {
        self.characteristics & CHAR_DELETED != 0
    }

    /// Is this the parent (`..`) entry?
    pub fn is_parent(&self) -> bool {
        self.characteristics & CHAR_PARENT != 0
    }

    /// Decoded name, `None` if the identifier is not valid CS0
    pub fn name(&self) -> Option<String> {
        string::decode_cs0(self.identifier)
    }
}

/// Iterator over the File Identifier Descriptors of directory data
pub struct FileIdentifierIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FileIdentifierIter<'a> {
    /// Iterate over directory data (already truncated to its information length)
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl<'a> Iterator for FileIdentifierIter<'a> {
    type Item = Result<FileIdentifier<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.offset..)?;
        if rest.len() < FileIdentifier::FIXED_LENGTH {
            return None;
        }

        match FileIdentifier::parse(rest) {
            Ok(fid) => {
                self.offset += fid.length;
                Some(Ok(fid))
            }
            Err(e) => {
                self.offset = self.data.len();
                Some(Err(e))
            }
        }
    }
}
