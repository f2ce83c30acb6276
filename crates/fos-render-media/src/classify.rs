//! Extension Classification
//!
//! Maps a file extension to the kind of element that renders it and the
//! playback strategies it is eligible for. The tables are fixed
//! configuration; the test suite checks they do not overlap.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Extensions the direct-streaming strategy can demux. Each of these is
/// also in one of the media source sets, since direct streaming falls back
/// into media source.
pub const DIRECT_STREAM_EXTS: &[&str] = &[".m4a", ".m4b", ".m4p", ".m4v", ".mp4"];

/// Video extensions playable through Media Source Extensions
pub const MEDIA_SOURCE_VIDEO_EXTS: &[&str] = &[".m4v", ".mkv", ".mp4", ".webm"];

/// Audio extensions playable through Media Source Extensions
pub const MEDIA_SOURCE_AUDIO_EXTS: &[&str] = &[".m4a", ".m4b", ".m4p", ".mp3"];

/// Video only playable from a blob URL
pub const VIDEO_EXTS: &[&str] = &[".mov", ".ogv"];

/// Audio only playable from a blob URL
pub const AUDIO_EXTS: &[&str] = &[".aac", ".oga", ".ogg", ".wav", ".flac"];

pub const IMAGE_EXTS: &[&str] = &[".bmp", ".gif", ".jpeg", ".jpg", ".png", ".svg"];

/// Rendered inline in a sandboxed frame
pub const DOCUMENT_EXTS: &[&str] = &[".css", ".html", ".js", ".md", ".pdf", ".srt", ".txt"];

/// Document extension rendered through `<object>` instead of `<iframe>`
pub const OBJECT_DOCUMENT_EXT: &str = ".pdf";

/// What a file is, as far as rendering is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCategory {
    StreamingVideo,
    StreamingAudio,
    PlainVideo,
    PlainAudio,
    Image,
    Document,
    Unknown,
}

static CATEGORIES: LazyLock<HashMap<&'static str, ContentCategory>> = LazyLock::new(|| {
    let tables = [
        (MEDIA_SOURCE_VIDEO_EXTS, ContentCategory::StreamingVideo),
        (MEDIA_SOURCE_AUDIO_EXTS, ContentCategory::StreamingAudio),
        (VIDEO_EXTS, ContentCategory::PlainVideo),
        (AUDIO_EXTS, ContentCategory::PlainAudio),
        (IMAGE_EXTS, ContentCategory::Image),
        (DOCUMENT_EXTS, ContentCategory::Document),
    ];
    tables
        .into_iter()
        .flat_map(|(exts, category)| exts.iter().map(move |ext| (*ext, category)))
        .collect()
});

impl ContentCategory {
    /// Classify a lowercased extension with its leading dot
    pub fn classify(extension: &str) -> Self {
        CATEGORIES.get(extension).copied().unwrap_or(Self::Unknown)
    }

    /// Eligible for the multi-strategy dispatcher
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::StreamingVideo | Self::StreamingAudio)
    }

    /// Element that renders this category. Unknown files that pass the
    /// text sniff render as documents, so they map to `<iframe>`.
    pub fn element_kind(&self, extension: &str) -> ElementKind {
        match self {
            Self::StreamingVideo | Self::PlainVideo => ElementKind::Video,
            Self::StreamingAudio | Self::PlainAudio => ElementKind::Audio,
            Self::Image => ElementKind::Img,
            Self::Document if extension == OBJECT_DOCUMENT_EXT => ElementKind::Object,
            Self::Document | Self::Unknown => ElementKind::Iframe,
        }
    }
}

/// True when the direct-streaming strategy can demux this extension
pub fn is_direct_stream_eligible(extension: &str) -> bool {
    DIRECT_STREAM_EXTS.contains(&extension)
}

/// Element tags a render can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Video,
    Audio,
    Img,
    Iframe,
    Object,
}

impl ElementKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Img => "img",
            Self::Iframe => "iframe",
            Self::Object => "object",
        }
    }
}

/// Lowercased extension of a file name including the leading dot, with
/// `path.extname` rules: `"a.tar.GZ"` gives `".gz"`, dotfiles and names
/// without a dot give `""`, a trailing dot gives `"."`.
pub fn extension_of(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    if base.bytes().all(|b| b == b'.') {
        return String::new();
    }
    match base.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => base[idx..].to_ascii_lowercase(),
    }
}
