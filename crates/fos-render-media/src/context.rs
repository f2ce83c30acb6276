//! Render Context
//!
//! Borrowed view of the host that jobs, the dispatcher and the adapters
//! work through during one loop turn.

use std::collections::HashMap;

use fos_dom::{Document, Event, EventType, NodeId};
use fos_media::{
    BlobStore, Capabilities, HTMLMediaElement, MediaError, MediaErrorCode, PlaybackEngine,
    SourceKind,
};

pub(crate) struct RenderContext<'a> {
    pub document: &'a mut Document,
    pub media: &'a mut HashMap<NodeId, HTMLMediaElement>,
    pub engine: &'a mut dyn PlaybackEngine,
    pub blobs: &'a mut BlobStore,
    pub capabilities: Capabilities,
}

impl RenderContext<'_> {
    /// Queue element events, stamped with the element's source generation
    pub fn fire(&mut self, node: NodeId, events: Vec<EventType>) {
        let generation = self.media.get(&node).map_or(0, |m| m.generation);
        for event_type in events {
            self.document
                .dispatch_event(Event::new(event_type, node).with_generation(generation));
        }
    }

    /// Give the element a new source and let the engine take it
    pub fn attach_source(&mut self, node: NodeId, source: SourceKind) {
        let Some(media) = self.media.get_mut(&node) else {
            return;
        };
        match &source {
            SourceKind::Blob { url, .. } => {
                media.set_src(url);
                if let Some(element) = self.document.element_mut(node) {
                    element.set_attr("src", url.as_str());
                }
            }
            SourceKind::Stream { .. } | SourceKind::MediaSource { .. } => {
                media.src.clear();
                media.load();
                if let Some(element) = self.document.element_mut(node) {
                    element.attrs.remove("src");
                }
            }
        }
        let events = self.engine.attach(node, media, source);
        self.fire(node, events);
    }

    pub fn append(&mut self, node: NodeId, chunk: &[u8]) {
        let Some(media) = self.media.get_mut(&node) else {
            return;
        };
        let events = self.engine.append(node, media, chunk);
        self.fire(node, events);
    }

    pub fn end_of_stream(&mut self, node: NodeId) {
        let Some(media) = self.media.get_mut(&node) else {
            return;
        };
        let events = self.engine.end_of_stream(node, media);
        self.fire(node, events);
    }

    pub fn detach_source(&mut self, node: NodeId) {
        if let Some(media) = self.media.get_mut(&node) {
            self.engine.detach(node, media);
        }
    }

    /// Drop the media state of elements that left the document
    pub fn forget_discarded(&mut self) {
        let document = &*self.document;
        let discarded: Vec<NodeId> = self
            .media
            .keys()
            .filter(|node| !document.contains(**node))
            .copied()
            .collect();
        for node in discarded {
            if let Some(mut media) = self.media.remove(&node) {
                self.engine.detach(node, &mut media);
                tracing::trace!(node = %node, "media state dropped");
            }
        }
    }

    pub fn play(&mut self, node: NodeId) -> Result<(), MediaError> {
        let media = self
            .media
            .get_mut(&node)
            .ok_or_else(|| MediaError::InvalidState("not a media element".into()))?;
        self.engine.play(node, media)
    }

    /// Fail the element's current source and fire `error` on it
    pub fn media_error(&mut self, node: NodeId, code: MediaErrorCode, message: impl Into<String>) {
        if let Some(media) = self.media.get_mut(&node) {
            media.fail(code, message);
        }
        self.fire(node, vec![EventType::Error]);
    }

    /// Message of the element's current error, if any
    pub fn error_message(&self, node: NodeId) -> Option<String> {
        self.media
            .get(&node)
            .and_then(|m| m.error.as_ref())
            .map(|e| e.message.clone())
    }
}
