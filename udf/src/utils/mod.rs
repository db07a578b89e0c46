//! Shared helpers for byte fields, checksums and identifiers

pub mod bytes;
pub mod checksum;
pub mod string;
