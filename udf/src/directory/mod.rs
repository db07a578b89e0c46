//! Directory walking
//!
//! One step of path resolution: find a named child in a directory.

pub mod fid;
pub mod iterator;
pub mod record;

use crate::block::BlockSource;
use crate::descriptor::ad::EXTENT_LENGTH_MASK;
use crate::error::{Result, UdfError};
use crate::file;
use crate::types::{DirectoryEntry, EntryRef, VolumeFormat, VolumeLayout, MAX_DIRECTORY_SIZE};
use fid::FileIdentifierIter;
use gpt_disk_io::BlockIo;

/// Find `component` in `directory`
///
/// UDF names are compared exactly after CS0 decoding; deleted and parent
/// entries are skipped. ISO9660 names are compared ignoring ASCII case with
/// the `;version` suffix stripped. The first match in on-disc order wins.
///
/// # Returns
/// The matching entry, or [`UdfError::NotFound`] once the directory is
/// exhausted
pub fn descend<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    directory: &EntryRef,
    component: &str,
) -> Result<DirectoryEntry> {
    match layout.format {
        VolumeFormat::Udf => descend_udf(source, layout, directory, component),
        VolumeFormat::Iso9660 => descend_iso(source, directory, component),
    }
}

fn descend_udf<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    layout: &VolumeLayout,
    directory: &EntryRef,
    component: &str,
) -> Result<DirectoryEntry> {
    let icb = match *directory {
        EntryRef::Udf { icb, .. } => icb,
        EntryRef::Iso { .. } => return Err(UdfError::CorruptEntry),
    };
    let entry = file::read_file_entry(source, layout, icb)?;
    if !entry.is_directory() {
        log::debug!("entry at {:?} is listed as a directory but has file type {}", icb, entry.file_type);
        return Err(UdfError::CorruptEntry);
    }
    let data = file::read_entry_data(source, layout, entry, Some(MAX_DIRECTORY_SIZE))?;

    for result in FileIdentifierIter::new(&data) {
        let fid = result?;
        if fid.is_deleted() || fid.is_parent() {
            continue;
        }

        let name = match fid.name() {
            Some(name) => name,
            None => {
                log::trace!("skipping identifier with unknown compression");
                continue;
            }
        };
        log::trace!("udf entry {:?} at {:?}", name, fid.icb.location);

        if name == component {
            return Ok(DirectoryEntry {
                name,
                is_directory: fid.is_directory(),
                entry_ref: EntryRef::Udf {
                    icb: fid.icb.location,
                    length: fid.icb.length & EXTENT_LENGTH_MASK,
                },
            });
        }
    }

    Err(UdfError::NotFound)
}

fn descend_iso<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    directory: &EntryRef,
    component: &str,
) -> Result<DirectoryEntry> {
    let (extent_lba, data_length) = match *directory {
        EntryRef::Iso {
            extent_lba,
            data_length,
        } => (extent_lba, data_length),
        EntryRef::Udf { .. } => return Err(UdfError::CorruptEntry),
    };

    for result in iterator::DirectoryIterator::new(source, extent_lba, data_length) {
        let entry = result?;
        if entry.name.eq_ignore_ascii_case(component) {
            return Ok(entry);
        }
    }

    Err(UdfError::NotFound)
}
