//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) describes the basic ISO9660
//! filesystem structure. See ECMA-119 8.4 for the full layout.

use crate::error::{Result, UdfError};
use crate::utils::bytes::{read_u16, read_u32, read_u8};

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[derive(Debug, Clone, Copy)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (always 1)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// CD001 magic bytes
    pub const MAGIC: &'static [u8; 5] = b"CD001";

    /// Read the header from the start of a sector
    pub fn parse(data: &[u8]) -> Self {
        let mut identifier = [0u8; 5];
        if let Some(id) = data.get(1..6) {
            identifier.copy_from_slice(id);
        }
        Self {
            type_code: read_u8(data, 0),
            identifier,
            version: read_u8(data, 6),
        }
    }

    /// Check if header is valid
    pub fn validate(&self) -> bool {
        &self.identifier == Self::MAGIC && self.version == 1
    }
}

/// Primary Volume Descriptor fields used for path resolution
#[derive(Debug, Clone)]
pub struct PrimaryVolumeDescriptor {
    /// Volume identifier (32 d-characters)
    pub volume_id: [u8; 32],

    /// Volume space size in logical blocks
    pub volume_space_size: u32,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Root directory record (34 bytes at BP 157)
    pub root_directory_record: [u8; 34],
}

impl PrimaryVolumeDescriptor {
    /// Descriptor size
    pub const SIZE: usize = 2048;

    const VOLUME_ID: usize = 40;
    const VOLUME_SPACE_SIZE: usize = 80;
    const LOGICAL_BLOCK_SIZE: usize = 128;
    const ROOT_DIRECTORY_RECORD: usize = 156;
}

/// Parse Primary Volume Descriptor from sector data
pub fn parse(data: &[u8]) -> Result<PrimaryVolumeDescriptor> {
    if data.len() < PrimaryVolumeDescriptor::SIZE {
        return Err(UdfError::UnsupportedFormat);
    }

    let header = VolumeDescriptorHeader::parse(data);
    if header.type_code != VolumeDescriptorType::Primary as u8 || !header.validate() {
        return Err(UdfError::UnsupportedFormat);
    }

    let mut volume_id = [0u8; 32];
    volume_id.copy_from_slice(
        &data[PrimaryVolumeDescriptor::VOLUME_ID..PrimaryVolumeDescriptor::VOLUME_ID + 32],
    );

    let mut root_directory_record = [0u8; 34];
    root_directory_record.copy_from_slice(
        &data[PrimaryVolumeDescriptor::ROOT_DIRECTORY_RECORD
            ..PrimaryVolumeDescriptor::ROOT_DIRECTORY_RECORD + 34],
    );

    Ok(PrimaryVolumeDescriptor {
        volume_id,
        volume_space_size: read_u32(data, PrimaryVolumeDescriptor::VOLUME_SPACE_SIZE),
        logical_block_size: read_u16(data, PrimaryVolumeDescriptor::LOGICAL_BLOCK_SIZE),
        root_directory_record,
    })
}
