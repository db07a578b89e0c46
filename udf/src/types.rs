//! Common types and constants for UDF and ISO9660

/// Logical block size (always 2048 bytes for optical media)
pub const SECTOR_SIZE: usize = 2048;

/// Anchor Volume Descriptor Pointer location (ECMA-167 3/8.4.2.1)
pub const ANCHOR_SECTOR: u32 = 256;

/// ISO9660 volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u32 = 16;

/// Maximum number of ISO9660 volume descriptors scanned
pub const MAX_VOLUME_DESCRIPTORS: u32 = 100;

/// Maximum number of components in a path
pub const MAX_PATH_DEPTH: usize = 64;

/// Maximum directory size read into memory (bytes)
pub const MAX_DIRECTORY_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum Volume Descriptor Pointer or Allocation Extent hops
pub const MAX_CHAIN_HOPS: usize = 32;

/// Filesystem the volume was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    /// UDF (ECMA-167 / OSTA)
    Udf,
    /// ISO9660 (ECMA-119) fallback
    Iso9660,
}

/// UDF logical block address within a partition (ECMA-167 4/7.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LbAddr {
    /// Logical block number, partition-relative
    pub block: u32,
    /// Partition reference number
    pub partition: u16,
}

/// Reference to a directory or file control structure
///
/// Never mutated; every lookup step produces a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    /// UDF long allocation descriptor pointing at an (Extended) File Entry
    Udf {
        /// Location of the file entry
        icb: LbAddr,
        /// Extent length of the ICB (bytes)
        length: u32,
    },
    /// ISO9660 directory record extent
    Iso {
        /// Extent location (absolute LBA)
        extent_lba: u32,
        /// Data length (bytes)
        data_length: u32,
    },
}

/// Volume layout, established once per lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeLayout {
    /// Which format the volume was recognized as
    pub format: VolumeFormat,

    /// Physical block of partition block 0 (0 for ISO9660)
    pub partition_start_block: u32,

    /// Partition length in blocks (volume space size for ISO9660)
    pub partition_length_blocks: u32,

    /// Partition reference number used by file structures (UDF)
    pub partition_ref: u16,

    /// Root directory
    pub root_entry_ref: EntryRef,
}

impl VolumeLayout {
    /// Translate a partition-relative address to a physical block
    ///
    /// Identity for ISO9660.
    pub fn physical_block(&self, addr: LbAddr) -> Option<u32> {
        match self.format {
            VolumeFormat::Iso9660 => Some(addr.block),
            VolumeFormat::Udf => {
                if addr.partition != self.partition_ref
                    || addr.block >= self.partition_length_blocks
                {
                    return None;
                }
                self.partition_start_block.checked_add(addr.block)
            }
        }
    }
}

/// Directory entry matched by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Decoded name (version suffix stripped for ISO9660)
    pub name: alloc::string::String,

    /// Directory (not a file)
    pub is_directory: bool,

    /// Control structure of the entry
    pub entry_ref: EntryRef,
}

/// Location and size of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Physical block of the first data extent
    pub start_block: u32,

    /// File size in bytes
    pub byte_length: u64,
}
