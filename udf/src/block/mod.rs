//! Block source
//!
//! Fixed-size 2048-byte logical block reads on top of any
//! [`gpt_disk_io::BlockIo`] device. Reads are always whole blocks: the
//! device either fills the buffer or the read fails.

mod cache;

pub use cache::BlockCache;

use crate::error::{Result, UdfError};
use crate::types::SECTOR_SIZE;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Logical block reader over a block device
pub struct BlockSource<'a, B: BlockIo> {
    block_io: &'a mut B,
    base_lba: u64,
    device_blocks_per_sector: u64,
    sector_count: Option<u64>,
    cache: Option<BlockCache>,
}

impl<'a, B: BlockIo> BlockSource<'a, B> {
    /// Create a block source
    ///
    /// # Arguments
    /// * `block_io` - Block device containing the disc image
    /// * `base_lba` - Device LBA where the image starts (0 if raw image)
    ///
    /// The device block size must evenly divide 2048.
    pub fn new(block_io: &'a mut B, base_lba: u64) -> Result<Self> {
        let device_block_size = block_io.block_size().to_u32() as usize;
        if device_block_size == 0
            || device_block_size > SECTOR_SIZE
            || SECTOR_SIZE % device_block_size != 0
        {
            log::debug!("unsupported device block size {}", device_block_size);
            return Err(UdfError::UnsupportedFormat);
        }
        let device_blocks_per_sector = (SECTOR_SIZE / device_block_size) as u64;

        let sector_count = match block_io.num_blocks() {
            Ok(blocks) => Some(blocks.saturating_sub(base_lba) / device_blocks_per_sector),
            Err(e) => {
                log::debug!("device size unknown ({:?}), range checks disabled", e);
                None
            }
        };

        Ok(Self {
            block_io,
            base_lba,
            device_blocks_per_sector,
            sector_count,
            cache: None,
        })
    }

    /// Enable the read-through block cache
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(BlockCache::new());
        self
    }

    /// Number of 2048-byte blocks on the medium, if the device reports it
    pub fn block_count(&self) -> Option<u64> {
        self.sector_count
    }

    /// Read logical block `lbn` into `buf`
    pub fn read_block(&mut self, lbn: u32, buf: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        if let Some(count) = self.sector_count {
            if lbn as u64 >= count {
                return Err(UdfError::OutOfRange);
            }
        }

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(lbn)) {
            buf.copy_from_slice(cached);
            return Ok(());
        }

        let lba = Lba(self.base_lba + lbn as u64 * self.device_blocks_per_sector);
        self.block_io.read_blocks(lba, buf).map_err(|e| {
            log::debug!("read of block {} failed: {:?}", lbn, e);
            UdfError::IoError
        })?;

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(lbn, buf);
        }

        Ok(())
    }

    /// Read `count` consecutive blocks starting at `lbn`, appending to `out`
    pub fn read_blocks_into(
        &mut self,
        lbn: u32,
        count: u32,
        out: &mut alloc::vec::Vec<u8>,
    ) -> Result<()> {
        let mut sector = [0u8; SECTOR_SIZE];
        for i in 0..count {
            let block = lbn.checked_add(i).ok_or(UdfError::OutOfRange)?;
            self.read_block(block, &mut sector)?;
            out.extend_from_slice(&sector);
        }
        Ok(())
    }
}
