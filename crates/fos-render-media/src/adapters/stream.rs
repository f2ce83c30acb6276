//! Direct streaming: progressive bytes straight into the demuxer.

use fos_dom::NodeId;
use fos_media::{MediaErrorCode, SourceKind};

use super::{ChunkReader, PlaybackAdapter, Strategy};
use crate::context::RenderContext;
use crate::error::RenderErrorKind;
use crate::file::FileResource;
use crate::mime::mime_type_or_default;

pub(crate) struct DirectStreamAdapter {
    mime: &'static str,
    reader: Option<ChunkReader>,
}

impl DirectStreamAdapter {
    pub fn new(extension: &str) -> Self {
        Self {
            mime: mime_type_or_default(extension),
            reader: None,
        }
    }
}

impl PlaybackAdapter for DirectStreamAdapter {
    fn strategy(&self) -> Strategy {
        Strategy::DirectStream
    }

    fn attach(
        &mut self,
        file: &dyn FileResource,
        node: NodeId,
        cx: &mut RenderContext<'_>,
    ) -> Result<(), RenderErrorKind> {
        cx.attach_source(node, SourceKind::Stream { mime: self.mime.to_string() });
        match file.open_read_stream(None) {
            Ok(reader) => self.reader = Some(ChunkReader::new(reader)),
            Err(e) => cx.media_error(node, MediaErrorCode::Network, e.to_string()),
        }
        Ok(())
    }

    fn pump(&mut self, node: NodeId, cx: &mut RenderContext<'_>) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        let failure = match reader.next_chunk() {
            Ok(Some(chunk)) => {
                cx.append(node, chunk);
                return true;
            }
            Ok(None) => None,
            Err(e) => Some(e),
        };

        self.reader = None;
        match failure {
            None => cx.end_of_stream(node),
            Some(e) => cx.media_error(node, MediaErrorCode::Network, e.to_string()),
        }
        false
    }

    fn release(&mut self, _cx: &mut RenderContext<'_>) {
        self.reader = None;
    }
}
