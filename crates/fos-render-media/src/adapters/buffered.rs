//! Media Source adapter: segments appended through a SourceBuffer.

use fos_dom::NodeId;
use fos_media::{MediaErrorCode, MediaSource, SourceKind};

use super::{ChunkReader, PlaybackAdapter, Strategy};
use crate::context::RenderContext;
use crate::error::RenderErrorKind;
use crate::file::FileResource;
use crate::mime::{codec_hint, mime_type_or_default};

pub(crate) struct MediaSourceAdapter {
    mime_codec: &'static str,
    media_source: MediaSource,
    buffer: Option<usize>,
    reader: Option<ChunkReader>,
}

impl MediaSourceAdapter {
    pub fn new(extension: &str) -> Self {
        Self {
            mime_codec: codec_hint(extension).unwrap_or_else(|| mime_type_or_default(extension)),
            media_source: MediaSource::new(),
            buffer: None,
            reader: None,
        }
    }
}

impl PlaybackAdapter for MediaSourceAdapter {
    fn strategy(&self) -> Strategy {
        Strategy::MediaSource
    }

    fn attach(
        &mut self,
        file: &dyn FileResource,
        node: NodeId,
        cx: &mut RenderContext<'_>,
    ) -> Result<(), RenderErrorKind> {
        cx.attach_source(
            node,
            SourceKind::MediaSource {
                mime_codec: self.mime_codec.to_string(),
            },
        );

        let opened = self
            .media_source
            .open()
            .and_then(|()| self.media_source.add_source_buffer(self.mime_codec));
        match opened {
            Ok(index) => self.buffer = Some(index),
            Err(e) => {
                cx.media_error(node, MediaErrorCode::SrcNotSupported, e.to_string());
                return Ok(());
            }
        }

        match file.open_read_stream(None) {
            Ok(reader) => self.reader = Some(ChunkReader::new(reader)),
            Err(e) => cx.media_error(node, MediaErrorCode::Network, e.to_string()),
        }
        Ok(())
    }

    fn pump(&mut self, node: NodeId, cx: &mut RenderContext<'_>) -> bool {
        let (Some(reader), Some(index)) = (self.reader.as_mut(), self.buffer) else {
            return false;
        };
        let failure = match reader.next_chunk() {
            Ok(Some(chunk)) => match self.media_source.append_buffer(index, chunk) {
                Ok(()) => {
                    cx.append(node, chunk);
                    return true;
                }
                Err(e) => Some((MediaErrorCode::Decode, e.to_string())),
            },
            Ok(None) => self
                .media_source
                .end_of_stream()
                .err()
                .map(|e| (MediaErrorCode::Decode, e.to_string())),
            Err(e) => Some((MediaErrorCode::Network, e.to_string())),
        };

        self.reader = None;
        match failure {
            None => cx.end_of_stream(node),
            Some((code, message)) => cx.media_error(node, code, message),
        }
        false
    }

    fn release(&mut self, _cx: &mut RenderContext<'_>) {
        self.reader = None;
        self.buffer = None;
        self.media_source.close();
    }
}
