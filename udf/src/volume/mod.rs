//! Volume descriptor scanning
//!
//! Establishes the [`VolumeLayout`] of a disc: UDF is tried first through the
//! Anchor Volume Descriptor Pointer at sector 256; if any required UDF
//! structure is missing or fails validation, the ISO9660 volume descriptor
//! set at sector 16 is used instead.

pub mod iso;
pub mod primary;
pub mod udf;

use crate::block::BlockSource;
use crate::error::{Result, UdfError};
use crate::types::VolumeLayout;
use gpt_disk_io::BlockIo;

/// Scan the volume and return its layout
///
/// Only a genuine I/O failure is terminal during the UDF attempt; every
/// other UDF failure falls back to ISO9660. If ISO9660 also fails, the
/// result is [`UdfError::UnsupportedFormat`].
pub fn scan<B: BlockIo>(source: &mut BlockSource<'_, B>) -> Result<VolumeLayout> {
    match udf::scan(source) {
        Ok(layout) => {
            log::debug!("recognized UDF volume: {:?}", layout);
            return Ok(layout);
        }
        Err(UdfError::IoError) => return Err(UdfError::IoError),
        Err(e) => log::debug!("UDF scan failed ({}), trying ISO9660", e),
    }

    match iso::scan(source) {
        Ok(layout) => {
            log::debug!("recognized ISO9660 volume: {:?}", layout);
            Ok(layout)
        }
        Err(UdfError::IoError) => Err(UdfError::IoError),
        Err(e) => {
            log::debug!("ISO9660 scan failed ({})", e);
            Err(UdfError::UnsupportedFormat)
        }
    }
}
