//! String handling utilities
//!
//! UDF names are OSTA CS0 d-strings; ISO9660 names are d-characters with a
//! `;version` suffix.

use alloc::string::String;

/// Decode an OSTA compressed unicode identifier (UDF 2.1.1)
///
/// The first byte is the compression ID: 8 means one byte per character,
/// 16 means big-endian UTF-16 code units. 254 and 255 are the UDF 2.50
/// equivalents of 8 and 16. Returns `None` for any other compression ID.
pub fn decode_cs0(bytes: &[u8]) -> Option<String> {
    let (&comp_id, body) = bytes.split_first()?;

    match comp_id {
        8 | 254 => Some(body.iter().map(|&b| char::from(b)).collect()),
        16 | 255 => {
            let units = body
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            Some(
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect(),
            )
        }
        _ => None,
    }
}

/// Trim trailing spaces from byte slice
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Convert ISO9660 d-characters to string
pub fn dchars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(trim_trailing_spaces(bytes))
}

/// Strip version suffix from filename (e.g., "FILE.TXT;1" -> "FILE.TXT")
/// Also removes trailing dot if present (e.g., "FILE.;1" -> "FILE")
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    if let Some(stripped) = base.strip_suffix('.') {
        stripped
    } else {
        base
    }
}
