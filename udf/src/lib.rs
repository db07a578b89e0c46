//! UDF / ISO9660 Path Resolver
//!
//! A `no_std` read-only lookup engine that finds a file by absolute path
//! inside an optical disc image and reports where its data starts.
//!
//! # Overview
//!
//! UDF (ECMA-167 / OSTA) is tried first. When its structures are missing or
//! fail validation the ISO9660 (ECMA-119) volume descriptors are used
//! instead. This crate provides:
//! - Anchor, volume descriptor sequence and file set parsing (UDF)
//! - Primary volume descriptor parsing (ISO9660)
//! - Directory descent by name
//! - Extent resolution and file reading
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Block layer** - 2048-byte logical block reads over [`gpt_disk_io::BlockIo`]
//! 2. **Descriptor layer** - Tags, checksums and allocation descriptors
//! 3. **Volume layer** - Establishes the [`VolumeLayout`]
//! 4. **Directory layer** - File Identifier Descriptors and directory records
//! 5. **File layer** - (Extended) File Entries and data extents
//! 6. **Path layer** - Splits the path and drives the layers above
//!
//! # Usage
//!
//! ```ignore
//! use udf::find_file;
//!
//! let file = find_file(&mut block_io, "/DIR/FILE.TXT")?;
//! println!("{} bytes at block {}", file.byte_length, file.start_block);
//!
//! // Fragmented files
//! let extents = udf::file_extents(&mut block_io, "/DIR/FILE.TXT")?;
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod block;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod file;
pub mod path;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{Result, UdfError};
pub use file::Extent;
pub use types::{DirectoryEntry, EntryRef, LbAddr, ResolvedFile, VolumeFormat, VolumeLayout};

// High-level API exports
pub use block::BlockSource;
pub use path::{file_extents, file_extents_at, find_file, find_file_at, lookup, read_file, read_file_at};
