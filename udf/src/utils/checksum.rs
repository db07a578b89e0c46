//! Checksum calculations for descriptor tag validation

use crc::{Crc, CRC_16_XMODEM};

/// CRC-ITU-T (x^16 + x^12 + x^5 + 1, initial 0) used by descriptor tags
const TAG_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Calculate the tag checksum (ECMA-167 3/7.2.3)
///
/// Sum modulo 256 of the 16 tag bytes, skipping the checksum byte itself.
pub fn tag_checksum(tag: &[u8]) -> u8 {
    tag.iter()
        .take(16)
        .enumerate()
        .filter(|(i, _)| *i != 4)
        .fold(0u8, |sum, (_, b)| sum.wrapping_add(*b))
}

/// Calculate the descriptor CRC over the bytes following the tag
pub fn descriptor_crc(data: &[u8]) -> u16 {
    TAG_CRC.checksum(data)
}
