//! Playback Adapters
//!
//! Interchangeable ways of attaching a resource to a media element:
//! - direct streaming: lowest latency, narrowest container support
//! - media source: segments appended through MSE, broad codec support
//! - blob URL: whole resource in memory, broadest support, size-bounded
//!
//! Adapters report trouble with the resource or the platform by failing
//! the element (an `error` event), which the dispatcher intercepts.
//! `attach` only returns `Err` for failures no other strategy could get
//! past.

mod stream;
mod buffered;
mod blob;

use std::fmt;
use std::io::{self, Read};

use fos_dom::NodeId;

use crate::context::RenderContext;
use crate::error::RenderErrorKind;
use crate::file::FileResource;
use crate::options::RenderOptions;

pub(crate) use blob::{materialize, BlobUrlAdapter};
pub(crate) use buffered::MediaSourceAdapter;
pub(crate) use stream::DirectStreamAdapter;

/// Bytes read per loop turn by the streaming adapters
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Playback strategy, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    DirectStream,
    MediaSource,
    BlobUrl,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectStream => "direct-stream",
            Self::MediaSource => "media-source",
            Self::BlobUrl => "blob-url",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) trait PlaybackAdapter {
    fn strategy(&self) -> Strategy;

    /// Point the element at the resource
    fn attach(
        &mut self,
        file: &dyn FileResource,
        node: NodeId,
        cx: &mut RenderContext<'_>,
    ) -> Result<(), RenderErrorKind>;

    /// Feed the next piece of the resource. False once nothing is left.
    fn pump(&mut self, node: NodeId, cx: &mut RenderContext<'_>) -> bool;

    /// Free what the adapter holds (reader, buffers, object URL) without
    /// touching the element, which may already belong to another source
    fn release(&mut self, cx: &mut RenderContext<'_>);

    /// Release the element's source; the adapter is dropped afterwards
    fn detach(&mut self, node: NodeId, cx: &mut RenderContext<'_>) {
        self.release(cx);
        cx.detach_source(node);
    }
}

pub(crate) fn build(strategy: Strategy, extension: &str, options: &RenderOptions) -> Box<dyn PlaybackAdapter> {
    match strategy {
        Strategy::DirectStream => Box::new(DirectStreamAdapter::new(extension)),
        Strategy::MediaSource => Box::new(MediaSourceAdapter::new(extension)),
        Strategy::BlobUrl => Box::new(BlobUrlAdapter::new(extension, *options)),
    }
}

/// Open-ended reader handing out fixed-size chunks
pub(crate) struct ChunkReader {
    reader: Box<dyn Read>,
    buf: Vec<u8>,
}

impl ChunkReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self {
            reader,
            buf: vec![0; CHUNK_SIZE],
        }
    }

    /// Next chunk, `None` at end of stream
    pub fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(&self.buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
