//! File Resources
//!
//! The input side of a render: a named resource readable by byte range.

use std::io::{self, Cursor, Read};
use std::sync::Arc;

/// Byte range of a read, `end` inclusive. Missing bounds mean "from the
/// start" and "to the end".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteRange {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Bytes `start..=end`
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Bytes from `start` to the end of the resource
    pub fn starting_at(start: u64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }
}

/// A file-like resource that can be rendered
///
/// Implementations must stay unchanged for the duration of a render.
pub trait FileResource {
    /// File name; the extension drives classification
    fn name(&self) -> &str;

    /// Size in bytes, when known
    fn length(&self) -> Option<u64> {
        None
    }

    /// Open a reader over `range`, or over the whole resource
    fn open_read_stream(&self, range: Option<ByteRange>) -> io::Result<Box<dyn Read>>;
}

/// In-memory resource
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    data: Arc<[u8]>,
    report_length: bool,
}

impl MemoryFile {
    pub fn new(name: &str, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.to_string(),
            data: data.into(),
            report_length: true,
        }
    }

    /// Hide the length, as streaming sources of unknown size do
    pub fn without_length(mut self) -> Self {
        self.report_length = false;
        self
    }
}

impl FileResource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn length(&self) -> Option<u64> {
        self.report_length.then_some(self.data.len() as u64)
    }

    fn open_read_stream(&self, range: Option<ByteRange>) -> io::Result<Box<dyn Read>> {
        let len = self.data.len() as u64;
        let range = range.unwrap_or_default();
        let start = range.start.unwrap_or(0);
        let end = range.end.map_or(len, |end| end.saturating_add(1).min(len));
        if start > len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("range start {start} beyond end of {len}-byte resource"),
            ));
        }

        let mut cursor = Cursor::new(Arc::clone(&self.data));
        cursor.set_position(start);
        Ok(Box::new(cursor.take(end.saturating_sub(start))))
    }
}

/// Read a whole range into memory
pub(crate) fn read_all(file: &dyn FileResource, range: Option<ByteRange>) -> io::Result<Vec<u8>> {
    let mut reader = file.open_read_stream(range)?;
    let mut data = match file.length() {
        Some(len) if range.is_none() => Vec::with_capacity(len.min(64 * 1024 * 1024) as usize),
        _ => Vec::new(),
    };
    reader.read_to_end(&mut data)?;
    Ok(data)
}
