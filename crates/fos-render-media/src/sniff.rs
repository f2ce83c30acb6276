//! Content Sniffing
//!
//! Decides whether a file with an unknown extension looks like text and
//! can be shown as an inline document.

use std::io;

use crate::file::{read_all, ByteRange, FileResource};

/// Bytes examined: offsets `0..=SNIFF_END`
pub const SNIFF_END: u64 = 1000;

/// Outcome of sniffing a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    Text,
    Binary,
}

/// Read the prefix of `file` and classify it
pub fn sniff(file: &dyn FileResource) -> io::Result<Sniffed> {
    let prefix = read_all(file, Some(ByteRange::new(0, SNIFF_END)))?;
    let verdict = if is_ascii_text(&prefix) {
        Sniffed::Text
    } else {
        Sniffed::Binary
    };
    tracing::debug!(file = file.name(), bytes = prefix.len(), ?verdict, "sniffed unknown extension");
    Ok(verdict)
}

/// Text decodes to printable ASCII plus tab, newline, form feed and
/// carriage return. Control bytes (NUL included) and anything outside
/// ASCII count as binary.
pub fn is_ascii_text(bytes: &[u8]) -> bool {
    String::from_utf8_lossy(bytes)
        .chars()
        .all(|c| matches!(c, ' '..='~' | '\t' | '\n' | '\r' | '\x0c'))
}
