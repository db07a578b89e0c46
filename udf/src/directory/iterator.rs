//! ISO9660 directory iteration
//!
//! Iterator for reading directory records sequentially. Records never cross
//! a sector boundary; a zero length byte pads out the rest of a sector.

use crate::block::BlockSource;
use crate::directory::record::DirectoryRecord;
use crate::error::{Result, UdfError};
use crate::types::{DirectoryEntry, EntryRef, SECTOR_SIZE};
use crate::utils::string;
use alloc::boxed::Box;
use alloc::string::String;
use gpt_disk_io::BlockIo;

/// Directory iterator
pub struct DirectoryIterator<'s, 'a, B: BlockIo> {
    source: &'s mut BlockSource<'a, B>,
    extent_lba: u32,
    extent_len: u32,
    offset: usize,
    current_sector: Box<[u8; SECTOR_SIZE]>,
    current_sector_lba: Option<u32>,
}

impl<'s, 'a, B: BlockIo> DirectoryIterator<'s, 'a, B> {
    /// Create new directory iterator
    pub fn new(source: &'s mut BlockSource<'a, B>, extent_lba: u32, extent_len: u32) -> Self {
        Self {
            source,
            extent_lba,
            extent_len,
            offset: 0,
            current_sector: Box::new([0u8; SECTOR_SIZE]),
            current_sector_lba: None,
        }
    }

    fn fail(&mut self, e: UdfError) -> Option<Result<DirectoryEntry>> {
        self.offset = self.extent_len as usize;
        Some(Err(e))
    }
}

impl<'s, 'a, B: BlockIo> Iterator for DirectoryIterator<'s, 'a, B> {
    type Item = Result<DirectoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Check if we've read all directory data
            if self.offset >= self.extent_len as usize {
                return None;
            }

            // Calculate current LBA and offset within sector
            let sector_offset = self.offset / SECTOR_SIZE;
            let lba = match self.extent_lba.checked_add(sector_offset as u32) {
                Some(lba) => lba,
                None => return self.fail(UdfError::CorruptEntry),
            };
            let offset_in_sector = self.offset % SECTOR_SIZE;

            // Read sector if needed
            if self.current_sector_lba != Some(lba) {
                if let Err(e) = self.source.read_block(lba, &mut self.current_sector) {
                    return self.fail(e);
                }
                self.current_sector_lba = Some(lba);
            }

            let sector_data = &self.current_sector[offset_in_sector..];

            // Zero-length record: skip to next sector
            if sector_data[0] == 0 {
                self.offset = (sector_offset + 1) * SECTOR_SIZE;
                continue;
            }

            let record = match DirectoryRecord::parse(sector_data) {
                Ok(r) => r,
                Err(e) => return self.fail(e),
            };

            self.offset += record.length as usize;

            // Skip "." and ".." entries
            if record.is_self_or_parent() {
                continue;
            }

            let name = match string::dchars_to_str(record.identifier) {
                Ok(s) => String::from(string::strip_version(s)),
                Err(_) => String::from_utf8_lossy(record.identifier).into_owned(),
            };
            log::trace!("iso9660 record {:?} at {}", name, record.extent_lba);
            if record.is_multi_extent() {
                log::debug!("{:?} spans multiple records, using the first extent", name);
            }

            return Some(Ok(DirectoryEntry {
                name,
                is_directory: record.is_directory(),
                entry_ref: EntryRef::Iso {
                    extent_lba: record.data_lba(),
                    data_length: record.data_length,
                },
            }));
        }
    }
}
