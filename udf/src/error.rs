//! Error types for UDF path resolution

use core::fmt;

/// Result type for UDF operations
pub type Result<T> = core::result::Result<T, UdfError>;

/// Errors that can occur while resolving a path
///
/// Every error is terminal for the lookup that produced it; nothing is
/// retried and no partial result is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdfError {
    /// Path is empty, relative, has no components or is too deep
    InvalidPath,

    /// I/O error reading from block device
    IoError,

    /// Block lies past the end of the medium
    OutOfRange,

    /// Neither UDF nor ISO9660 descriptors validate
    UnsupportedFormat,

    /// A structure failed validation on an otherwise recognized volume
    CorruptEntry,

    /// File or directory not found
    NotFound,
}

impl fmt::Display for UdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath => write!(f, "Invalid path format"),
            Self::IoError => write!(f, "I/O error reading block device"),
            Self::OutOfRange => write!(f, "Block out of range of the medium"),
            Self::UnsupportedFormat => write!(f, "No valid UDF or ISO9660 volume found"),
            Self::CorruptEntry => write!(f, "Corrupted filesystem structure"),
            Self::NotFound => write!(f, "File or directory not found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UdfError {}
