//! Path resolution
//!
//! Splits an absolute path, scans the volume once and folds the directory
//! walker over the components.

use crate::block::BlockSource;
use crate::directory;
use crate::error::{Result, UdfError};
use crate::file::{self, Extent};
use crate::types::{DirectoryEntry, ResolvedFile, VolumeLayout, MAX_PATH_DEPTH};
use crate::volume;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Path separator
pub const SEPARATOR: char = '/';

/// Split an absolute path into its non-empty components
///
/// Repeated separators collapse. A path that is empty, relative, resolves to
/// no components, or is deeper than [`MAX_PATH_DEPTH`] is
/// [`UdfError::InvalidPath`].
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    if !path.starts_with(SEPARATOR) {
        return Err(UdfError::InvalidPath);
    }

    let components: Vec<&str> = path.split(SEPARATOR).filter(|c| !c.is_empty()).collect();
    if components.is_empty() || components.len() > MAX_PATH_DEPTH {
        return Err(UdfError::InvalidPath);
    }

    Ok(components)
}

/// Resolve `path` to its directory entry
///
/// Every component but the last must name a directory; a file met before
/// the path is consumed is [`UdfError::NotFound`].
pub fn lookup<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    path: &str,
) -> Result<(VolumeLayout, DirectoryEntry)> {
    let components = split_path(path)?;
    let layout = volume::scan(source)?;

    let (last, parents) = components.split_last().ok_or(UdfError::InvalidPath)?;

    let mut current = layout.root_entry_ref;
    for component in parents {
        let entry = directory::descend(source, &layout, &current, component)?;
        if !entry.is_directory {
            log::debug!("{:?} in {:?} is not a directory", component, path);
            return Err(UdfError::NotFound);
        }
        current = entry.entry_ref;
    }

    let entry = directory::descend(source, &layout, &current, last)?;
    log::debug!("resolved {:?} to {:?}", path, entry.entry_ref);
    Ok((layout, entry))
}

/// Find a file and report its first data block and size
///
/// # Arguments
/// * `block_io` - Block device holding the disc image at LBA 0
/// * `path` - Absolute path, e.g. `/DIR/FILE.TXT`
///
/// # Returns
/// Physical block of the first extent and the file size. Fragmented files
/// report only their first fragment; see [`file_extents`].
pub fn find_file<B: BlockIo>(block_io: &mut B, path: &str) -> Result<ResolvedFile> {
    find_file_at(block_io, 0, path)
}

/// Like [`find_file`], for an image starting at device LBA `base_lba`
pub fn find_file_at<B: BlockIo>(block_io: &mut B, base_lba: u64, path: &str) -> Result<ResolvedFile> {
    let mut source = BlockSource::new(block_io, base_lba)?.with_cache();
    let (layout, entry) = lookup(&mut source, path)?;
    file::resolve(&mut source, &layout, &entry.entry_ref)
}

/// List every data extent of a file, in order
pub fn file_extents<B: BlockIo>(block_io: &mut B, path: &str) -> Result<Vec<Extent>> {
    file_extents_at(block_io, 0, path)
}

/// Like [`file_extents`], for an image starting at device LBA `base_lba`
pub fn file_extents_at<B: BlockIo>(block_io: &mut B, base_lba: u64, path: &str) -> Result<Vec<Extent>> {
    let mut source = BlockSource::new(block_io, base_lba)?.with_cache();
    let (layout, entry) = lookup(&mut source, path)?;
    file::extents(&mut source, &layout, &entry.entry_ref)
}

/// Read a whole file into memory
pub fn read_file<B: BlockIo>(block_io: &mut B, path: &str) -> Result<Vec<u8>> {
    read_file_at(block_io, 0, path)
}

/// Like [`read_file`], for an image starting at device LBA `base_lba`
pub fn read_file_at<B: BlockIo>(block_io: &mut B, base_lba: u64, path: &str) -> Result<Vec<u8>> {
    let mut source = BlockSource::new(block_io, base_lba)?.with_cache();
    let (layout, entry) = lookup(&mut source, path)?;
    file::read_data(&mut source, &layout, &entry.entry_ref, None)
}
