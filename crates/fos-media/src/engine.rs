//! Playback Engine
//!
//! The seam between media elements and the platform media pipeline. The
//! engine consumes the bytes an element is fed and answers with the
//! lifecycle events the element fires.

use std::collections::HashMap;

use fos_dom::{EventType, NodeId};

use crate::container::{Container, PROBE_LEN};
use crate::{HTMLMediaElement, MediaError, MediaErrorCode, MediaSource, NetworkState, ReadyState};

/// What the platform offers to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Media Source Extensions are available
    pub media_source: bool,
}

impl Capabilities {
    pub fn new(media_source: bool) -> Self {
        Self { media_source }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { media_source: true }
    }
}

/// How an element is being fed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Progressive byte stream pushed straight into the demuxer
    Stream { mime: String },
    /// MSE source buffer with an explicit codec string
    MediaSource { mime_codec: String },
    /// Materialized blob, delivered in one piece
    Blob { url: String, mime: String },
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stream { .. } => "stream",
            Self::MediaSource { .. } => "media-source",
            Self::Blob { .. } => "blob",
        }
    }
}

/// Platform media pipeline
///
/// Callers run `HTMLMediaElement::load` before `attach`, so the element
/// already carries the new source generation. Every method returns the
/// events the element fires in response, in order.
pub trait PlaybackEngine {
    /// A new source was assigned to the element
    fn attach(&mut self, node: NodeId, media: &mut HTMLMediaElement, source: SourceKind) -> Vec<EventType>;

    /// More bytes of the current source
    fn append(&mut self, node: NodeId, media: &mut HTMLMediaElement, chunk: &[u8]) -> Vec<EventType>;

    /// The current source has no more bytes
    fn end_of_stream(&mut self, node: NodeId, media: &mut HTMLMediaElement) -> Vec<EventType>;

    /// Begin playback
    fn play(&mut self, _node: NodeId, media: &mut HTMLMediaElement) -> Result<(), MediaError> {
        media.play()
    }

    /// The element dropped its source
    fn detach(&mut self, node: NodeId, media: &mut HTMLMediaElement);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Probing,
    Playable,
    Failed,
}

#[derive(Debug)]
struct Pipeline {
    source: SourceKind,
    header: Vec<u8>,
    received: u64,
    state: PipelineState,
}

/// Engine for headless embedders
///
/// Does not decode. It probes the container from the first bytes and
/// decides whether the current source kind can carry it: progressive
/// streams only handle ISO base media, MSE needs a supported type matching
/// the container, blobs take any recognized container.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    pipelines: HashMap<NodeId, Pipeline>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements with an attached source
    pub fn active_pipelines(&self) -> usize {
        self.pipelines.len()
    }
}

impl PlaybackEngine for HeadlessEngine {
    fn attach(&mut self, node: NodeId, media: &mut HTMLMediaElement, source: SourceKind) -> Vec<EventType> {
        tracing::debug!(node = %node, source = source.label(), "engine attach");
        media.network_state = NetworkState::Loading;
        self.pipelines.insert(
            node,
            Pipeline {
                source,
                header: Vec::with_capacity(PROBE_LEN),
                received: 0,
                state: PipelineState::Probing,
            },
        );
        Vec::new()
    }

    fn append(&mut self, node: NodeId, media: &mut HTMLMediaElement, chunk: &[u8]) -> Vec<EventType> {
        let mut events = Vec::new();
        let Some(pipeline) = self.pipelines.get_mut(&node) else {
            return events;
        };
        if pipeline.state == PipelineState::Failed || chunk.is_empty() {
            return events;
        }

        if pipeline.received == 0 {
            events.push(EventType::LoadStart);
        }
        pipeline.received += chunk.len() as u64;

        let wanted = PROBE_LEN.saturating_sub(pipeline.header.len()).min(chunk.len());
        pipeline.header.extend_from_slice(&chunk[..wanted]);

        if pipeline.state == PipelineState::Probing && pipeline.header.len() >= PROBE_LEN {
            resolve(pipeline, media, &mut events);
        }
        if pipeline.state == PipelineState::Playable {
            events.push(EventType::Progress);
        }
        events
    }

    fn end_of_stream(&mut self, node: NodeId, media: &mut HTMLMediaElement) -> Vec<EventType> {
        let mut events = Vec::new();
        let Some(pipeline) = self.pipelines.get_mut(&node) else {
            return events;
        };

        if pipeline.state == PipelineState::Probing {
            if pipeline.received == 0 {
                pipeline.state = PipelineState::Failed;
                media.fail(MediaErrorCode::SrcNotSupported, "empty media resource");
                events.push(EventType::Error);
                return events;
            }
            resolve(pipeline, media, &mut events);
        }
        if pipeline.state == PipelineState::Playable {
            media.ready_state = ReadyState::HaveEnoughData;
            media.network_state = NetworkState::Idle;
            events.push(EventType::CanPlay);
        }
        events
    }

    fn detach(&mut self, node: NodeId, _media: &mut HTMLMediaElement) {
        self.pipelines.remove(&node);
    }
}

fn resolve(pipeline: &mut Pipeline, media: &mut HTMLMediaElement, events: &mut Vec<EventType>) {
    let container = Container::probe(&pipeline.header);
    match container {
        Some(container) if accepts(&pipeline.source, container) => {
            pipeline.state = PipelineState::Playable;
            media.ready_state = ReadyState::HaveMetadata;
            events.push(EventType::LoadedMetadata);
        }
        _ => {
            pipeline.state = PipelineState::Failed;
            let message = match container {
                Some(c) => format!("{:?} cannot be played from a {} source", c, pipeline.source.label()),
                None => "unrecognized media container".to_string(),
            };
            media.fail(MediaErrorCode::SrcNotSupported, message);
            events.push(EventType::Error);
        }
    }
}

fn accepts(source: &SourceKind, container: Container) -> bool {
    match source {
        SourceKind::Stream { .. } => container == Container::Mp4,
        SourceKind::MediaSource { mime_codec } => {
            let essence = mime_codec.split(';').next().unwrap_or("").trim();
            MediaSource::is_type_supported(mime_codec)
                && container.mse_essences().iter().any(|e| e.eq_ignore_ascii_case(essence))
        }
        SourceKind::Blob { .. } => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Document;

    const MP4: &[u8] = b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00isomiso2";
    const MKV: &[u8] = b"\x1A\x45\xDF\xA3\x9F\x42\x86\x81\x01\x42\xF7\x81\x01";

    fn element() -> (NodeId, HTMLMediaElement) {
        let mut doc = Document::default();
        let node = doc.create_element("video");
        let mut media = HTMLMediaElement::video();
        media.load();
        (node, media)
    }

    #[test]
    fn test_stream_plays_mp4() {
        let (node, mut media) = element();
        let mut engine = HeadlessEngine::new();
        engine.attach(node, &mut media, SourceKind::Stream { mime: "video/mp4".into() });

        let events = engine.append(node, &mut media, MP4);
        assert_eq!(events, vec![EventType::LoadStart, EventType::LoadedMetadata, EventType::Progress]);
        assert_eq!(media.ready_state, ReadyState::HaveMetadata);

        let events = engine.end_of_stream(node, &mut media);
        assert_eq!(events, vec![EventType::CanPlay]);
    }

    #[test]
    fn test_stream_rejects_matroska() {
        let (node, mut media) = element();
        let mut engine = HeadlessEngine::new();
        engine.attach(node, &mut media, SourceKind::Stream { mime: "video/x-matroska".into() });

        let events = engine.append(node, &mut media, MKV);
        assert_eq!(events, vec![EventType::LoadStart, EventType::Error]);
        assert!(media.error.is_some());

        // A failed pipeline stays silent
        assert!(engine.append(node, &mut media, MKV).is_empty());
    }

    #[test]
    fn test_media_source_matches_container() {
        let (node, mut media) = element();
        let mut engine = HeadlessEngine::new();
        let mime_codec = "video/webm; codecs=\"vorbis, vp8\"".to_string();
        engine.attach(node, &mut media, SourceKind::MediaSource { mime_codec });
        let events = engine.append(node, &mut media, MKV);
        assert!(events.contains(&EventType::LoadedMetadata));

        media.load();
        let mime_codec = "audio/mpeg".to_string();
        engine.attach(node, &mut media, SourceKind::MediaSource { mime_codec });
        let events = engine.append(node, &mut media, MP4);
        assert!(events.contains(&EventType::Error));
    }

    #[test]
    fn test_short_blob_resolves_at_end_of_stream() {
        let (node, mut media) = element();
        let mut engine = HeadlessEngine::new();
        let source = SourceKind::Blob { url: "blob:null/1".into(), mime: "audio/mpeg".into() };
        engine.attach(node, &mut media, source);

        assert_eq!(engine.append(node, &mut media, b"ID3\x04"), vec![EventType::LoadStart]);
        let events = engine.end_of_stream(node, &mut media);
        assert_eq!(events, vec![EventType::LoadedMetadata, EventType::CanPlay]);

        engine.detach(node, &mut media);
        assert_eq!(engine.active_pipelines(), 0);
    }

    #[test]
    fn test_empty_source_fails() {
        let (node, mut media) = element();
        let mut engine = HeadlessEngine::new();
        let source = SourceKind::Blob { url: "blob:null/2".into(), mime: String::new() };
        engine.attach(node, &mut media, source);
        assert_eq!(engine.end_of_stream(node, &mut media), vec![EventType::Error]);
    }
}
