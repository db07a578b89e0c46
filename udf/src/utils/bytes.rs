//! Little-endian field extraction
//!
//! All on-disc integers used here are little-endian (ECMA-167 1/7.1.3),
//! and ISO9660 both-endian fields are read from their little-endian half.
//! Callers validate descriptor lengths before reading fields, so an
//! out-of-bounds offset reads as zero rather than panicking.

use crate::types::SECTOR_SIZE;

/// Read a byte at `offset`
pub fn read_u8(data: &[u8], offset: usize) -> u8 {
    data.get(offset).copied().unwrap_or(0)
}

/// Read a little-endian u16 at `offset`
pub fn read_u16(data: &[u8], offset: usize) -> u16 {
    match data.get(offset..offset + 2) {
        Some(b) => u16::from_le_bytes([b[0], b[1]]),
        None => 0,
    }
}

/// Read a little-endian u32 at `offset`
pub fn read_u32(data: &[u8], offset: usize) -> u32 {
    match data.get(offset..offset + 4) {
        Some(b) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        None => 0,
    }
}

/// Read a little-endian u64 at `offset`
pub fn read_u64(data: &[u8], offset: usize) -> u64 {
    match data.get(offset..offset + 8) {
        Some(b) => {
            let mut le = [0u8; 8];
            le.copy_from_slice(b);
            u64::from_le_bytes(le)
        }
        None => 0,
    }
}

/// Calculate number of sectors needed for byte count
pub fn sectors_for_bytes(byte_count: u64) -> u64 {
    byte_count.div_ceil(SECTOR_SIZE as u64)
}
