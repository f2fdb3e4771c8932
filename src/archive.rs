//! Single-entry zip archives and text decoding.
//!
//! CV records are stored as a zip blob holding exactly one XML file. The
//! XML itself may be UTF-8 or ISO-8859-1 depending on when it was exported.
//! Anything that is not valid UTF-8 is read as ISO-8859-1, which accepts
//! every byte sequence.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;

use crate::error::{LattesError, Result};

/// Maximum decompressed bytes read from the archive entry (zip-bomb protection).
const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// Returns the bytes of the archive's first entry.
///
/// CV archives carry a single file; any further entries are ignored.
pub fn unpack_single_entry(blob: &[u8]) -> Result<Vec<u8>> {
    if blob.is_empty() {
        return Err(LattesError::EmptyBlob);
    }
    let mut archive = zip::ZipArchive::new(Cursor::new(blob))?;
    if archive.len() == 0 {
        return Err(LattesError::EmptyArchive);
    }
    let entry = archive.by_index(0)?;
    let mut out = Vec::new();
    entry.take(MAX_ENTRY_BYTES).read_to_end(&mut out)?;
    if out.len() as u64 >= MAX_ENTRY_BYTES {
        return Err(LattesError::EntryTooLarge(MAX_ENTRY_BYTES));
    }
    Ok(out)
}

/// Builds a one-entry archive, the inverse of [`unpack_single_entry`].
pub fn pack_single_entry(name: &str, content: &[u8]) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(name, SimpleFileOptions::default())?;
    writer.write_all(content)?;
    Ok(writer.finish()?.into_inner())
}

/// Decodes XML bytes: UTF-8 when valid, ISO-8859-1 otherwise. Never fails.
pub fn decode(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        debug!("decoded document as UTF-8");
        return text.strip_prefix('\u{feff}').unwrap_or(text).to_owned();
    }
    debug!("decoded document as ISO-8859-1");
    decode_latin1(bytes)
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
