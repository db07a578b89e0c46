//! UDF volume structure scanning (ECMA-167 part 3 and 4/14.1)
//!
//! Anchor Volume Descriptor Pointer -> Volume Descriptor Sequence
//! (Partition + Logical Volume Descriptors) -> File Set Descriptor -> root
//! directory ICB.

use crate::block::BlockSource;
use crate::descriptor::{read_tagged, DescriptorTag, ExtentAd, LongAd, TagIdentifier};
use crate::error::{Result, UdfError};
use crate::types::{
    EntryRef, VolumeFormat, VolumeLayout, ANCHOR_SECTOR, MAX_CHAIN_HOPS, SECTOR_SIZE,
};
use crate::utils::bytes::{read_u16, read_u32, read_u8};
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Anchor Volume Descriptor Pointer (ECMA-167 3/10.2)
#[derive(Debug, Clone, Copy)]
pub struct AnchorVolumeDescriptorPointer {
    /// Main Volume Descriptor Sequence extent
    pub main: ExtentAd,
    /// Reserve Volume Descriptor Sequence extent
    pub reserve: ExtentAd,
}

impl AnchorVolumeDescriptorPointer {
    /// Parse from a tagged descriptor block
    pub fn parse(data: &[u8]) -> Self {
        Self {
            main: ExtentAd::parse(&data[16..]),
            reserve: ExtentAd::parse(&data[24..]),
        }
    }
}

/// Partition Descriptor (ECMA-167 3/10.5)
#[derive(Debug, Clone, Copy)]
pub struct PartitionDescriptor {
    /// Volume Descriptor Sequence Number
    pub sequence_number: u32,
    /// Partition number referenced by partition maps
    pub partition_number: u16,
    /// Physical block of partition block 0
    pub starting_location: u32,
    /// Partition length in blocks
    pub length: u32,
}

impl PartitionDescriptor {
    /// Parse from a tagged descriptor block
    pub fn parse(data: &[u8]) -> Self {
        Self {
            sequence_number: read_u32(data, 16),
            partition_number: read_u16(data, 22),
            starting_location: read_u32(data, 188),
            length: read_u32(data, 192),
        }
    }
}

/// Partition map entry (ECMA-167 3/10.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionMap {
    /// Type 1: maps directly onto a Partition Descriptor
    Type1 {
        /// Partition number of the Partition Descriptor
        partition_number: u16,
    },
    /// Type 2 or unknown (virtual, sparable, metadata)
    Other {
        /// Map type
        map_type: u8,
    },
}

/// Logical Volume Descriptor (ECMA-167 3/10.6)
#[derive(Debug, Clone)]
pub struct LogicalVolumeDescriptor {
    /// Volume Descriptor Sequence Number
    pub sequence_number: u32,
    /// Logical block size in bytes
    pub logical_block_size: u32,
    /// Location of the File Set Descriptor
    pub file_set: LongAd,
    /// Partition maps, indexed by partition reference number
    pub partition_maps: Vec<PartitionMap>,
}

impl LogicalVolumeDescriptor {
    const PARTITION_MAPS: usize = 440;

    /// Parse from a tagged descriptor block
    pub fn parse(data: &[u8]) -> Self {
        let map_table_length = read_u32(data, 264) as usize;
        let map_count = read_u32(data, 268) as usize;

        let table_end = (Self::PARTITION_MAPS + map_table_length).min(data.len());
        let mut partition_maps = Vec::new();
        let mut offset = Self::PARTITION_MAPS;
        while partition_maps.len() < map_count && offset + 2 <= table_end {
            let map_type = read_u8(data, offset);
            let map_length = read_u8(data, offset + 1) as usize;
            if map_length < 2 {
                break;
            }
            let map = match (map_type, map_length) {
                (1, 6) => PartitionMap::Type1 {
                    partition_number: read_u16(data, offset + 4),
                },
                _ => PartitionMap::Other { map_type },
            };
            partition_maps.push(map);
            offset += map_length;
        }

        Self {
            sequence_number: read_u32(data, 16),
            logical_block_size: read_u32(data, 212),
            file_set: LongAd::parse(&data[248..]),
            partition_maps,
        }
    }
}

/// File Set Descriptor (ECMA-167 4/14.1)
#[derive(Debug, Clone, Copy)]
pub struct FileSetDescriptor {
    /// Root directory ICB
    pub root_icb: LongAd,
}

impl FileSetDescriptor {
    /// Parse from a tagged descriptor block
    pub fn parse(data: &[u8]) -> Self {
        Self {
            root_icb: LongAd::parse(&data[400..]),
        }
    }
}

/// Prevailing descriptors collected from one Volume Descriptor Sequence
#[derive(Debug, Default)]
pub struct VolumeDescriptors {
    /// Prevailing Partition Descriptor of each partition number
    pub partitions: Vec<PartitionDescriptor>,
    /// Prevailing Logical Volume Descriptor
    pub logical_volume: Option<LogicalVolumeDescriptor>,
}

impl VolumeDescriptors {
    fn is_complete(&self) -> bool {
        !self.partitions.is_empty() && self.logical_volume.is_some()
    }

    /// Partition Descriptor recorded for `partition_number`
    pub fn partition(&self, partition_number: u16) -> Option<&PartitionDescriptor> {
        self.partitions
            .iter()
            .find(|pd| pd.partition_number == partition_number)
    }

    fn record_partition(&mut self, pd: PartitionDescriptor, block: u32) {
        let existing = self
            .partitions
            .iter_mut()
            .find(|prev| prev.partition_number == pd.partition_number);
        match existing {
            Some(prev) if prev.sequence_number >= pd.sequence_number => {}
            Some(prev) => {
                log::warn!(
                    "partition descriptor {} superseded at block {}",
                    pd.partition_number,
                    block
                );
                *prev = pd;
            }
            None => self.partitions.push(pd),
        }
    }
}

/// Scan UDF structures and return the volume layout
pub fn scan<B: BlockIo>(source: &mut BlockSource<'_, B>) -> Result<VolumeLayout> {
    let mut buffer = [0u8; SECTOR_SIZE];

    let tag = read_tagged(source, ANCHOR_SECTOR, ANCHOR_SECTOR, &mut buffer)?;
    if !tag.is(TagIdentifier::AnchorVolumePointer) {
        log::trace!("sector {} holds tag {}, not an anchor", ANCHOR_SECTOR, tag.identifier);
        return Err(UdfError::UnsupportedFormat);
    }
    let anchor = AnchorVolumeDescriptorPointer::parse(&buffer);
    log::trace!("anchor: {:?}", anchor);

    let descriptors = match walk_sequence(source, anchor.main) {
        Ok(d) if d.is_complete() => d,
        Err(UdfError::IoError) => return Err(UdfError::IoError),
        other => {
            log::debug!("main volume descriptor sequence unusable ({:?}), trying reserve", other.err());
            walk_sequence(source, anchor.reserve)?
        }
    };

    let logical_volume = descriptors
        .logical_volume
        .as_ref()
        .ok_or(UdfError::UnsupportedFormat)?;

    if logical_volume.logical_block_size as usize != SECTOR_SIZE {
        log::debug!("unsupported UDF block size {}", logical_volume.logical_block_size);
        return Err(UdfError::UnsupportedFormat);
    }

    let partition_ref = logical_volume.file_set.location.partition;
    let partition = match logical_volume.partition_maps.get(partition_ref as usize) {
        Some(&PartitionMap::Type1 { partition_number }) => {
            *descriptors.partition(partition_number).ok_or_else(|| {
                log::debug!("no partition descriptor numbered {}", partition_number);
                UdfError::UnsupportedFormat
            })?
        }
        map => {
            log::debug!("unsupported partition map {:?} for reference {}", map, partition_ref);
            return Err(UdfError::UnsupportedFormat);
        }
    };

    let fsd_block = logical_volume.file_set.location.block;
    if fsd_block >= partition.length {
        return Err(UdfError::UnsupportedFormat);
    }
    let physical = partition
        .starting_location
        .checked_add(fsd_block)
        .ok_or(UdfError::UnsupportedFormat)?;
    let tag = read_tagged(source, physical, fsd_block, &mut buffer)?;
    if !tag.is(TagIdentifier::FileSet) {
        return Err(UdfError::UnsupportedFormat);
    }
    let file_set = FileSetDescriptor::parse(&buffer);

    let root = file_set.root_icb;
    if root.location.partition != partition_ref {
        log::debug!("root directory in partition reference {}", root.location.partition);
        return Err(UdfError::UnsupportedFormat);
    }

    Ok(VolumeLayout {
        format: VolumeFormat::Udf,
        partition_start_block: partition.starting_location,
        partition_length_blocks: partition.length,
        partition_ref,
        root_entry_ref: EntryRef::Udf {
            icb: root.location,
            length: root.length & crate::descriptor::ad::EXTENT_LENGTH_MASK,
        },
    })
}

/// Walk a Volume Descriptor Sequence
///
/// Follows Volume Descriptor Pointers, stops at a Terminating Descriptor or
/// an unrecorded block, and keeps the descriptor with the highest sequence
/// number when one kind appears more than once.
pub fn walk_sequence<B: BlockIo>(
    source: &mut BlockSource<'_, B>,
    extent: ExtentAd,
) -> Result<VolumeDescriptors> {
    let mut buffer = [0u8; SECTOR_SIZE];
    let mut descriptors = VolumeDescriptors::default();
    let mut extent = extent;
    let mut hops = 0;

    'sequence: loop {
        for i in 0..extent.sector_count() {
            let block = extent.location.checked_add(i).ok_or(UdfError::OutOfRange)?;
            source.read_block(block, &mut buffer)?;
            if read_u16(&buffer, 0) == 0 {
                break 'sequence;
            }
            let tag = DescriptorTag::parse(&buffer, Some(block))?;

            match tag.kind() {
                Some(TagIdentifier::Partition) => {
                    descriptors.record_partition(PartitionDescriptor::parse(&buffer), block);
                }
                Some(TagIdentifier::LogicalVolume) => {
                    let lvd = LogicalVolumeDescriptor::parse(&buffer);
                    let supersedes = match &descriptors.logical_volume {
                        Some(prev) => lvd.sequence_number > prev.sequence_number,
                        None => true,
                    };
                    if supersedes {
                        if descriptors.logical_volume.is_some() {
                            log::warn!("logical volume descriptor superseded at block {}", block);
                        }
                        descriptors.logical_volume = Some(lvd);
                    }
                }
                Some(TagIdentifier::VolumePointer) => {
                    hops += 1;
                    if hops > MAX_CHAIN_HOPS {
                        return Err(UdfError::CorruptEntry);
                    }
                    extent = ExtentAd::parse(&buffer[20..]);
                    log::trace!("volume descriptor pointer to {:?}", extent);
                    continue 'sequence;
                }
                Some(TagIdentifier::Terminating) => break 'sequence,
                _ => log::trace!("skipping volume descriptor {} at {}", tag.identifier, block),
            }
        }
        break;
    }

    Ok(descriptors)
}
