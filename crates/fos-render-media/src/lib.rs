//! fOS Render Media
//!
//! Renders file resources into `<video>`, `<audio>`, `<img>`, `<iframe>`
//! and `<object>` elements of an fOS document.
//!
//! Features:
//! - Extension classification with a text sniff for unknown extensions
//! - Audio/video playback through a fallback chain: direct streaming,
//!   Media Source Extensions, then an in-memory blob URL
//! - Playback position carried across strategy fallbacks
//! - Single-fire completion callbacks on a cooperative event loop
//!
//! ```ignore
//! let mut host = MediaHost::new(Document::default());
//! let body = host.document().body();
//! host.append(MemoryFile::new("clip.mp4", bytes), body, RenderOptions::default(), |result| {
//!     println!("{result:?}");
//! })?;
//! host.run_until_idle();
//! ```

mod adapters;
mod classify;
mod context;
mod dispatcher;
mod error;
mod file;
mod guard;
mod host;
mod mime;
mod options;
mod session;
mod sniff;
mod static_render;

pub use adapters::{Strategy, CHUNK_SIZE};
pub use classify::{
    extension_of, is_direct_stream_eligible, ContentCategory, ElementKind, AUDIO_EXTS,
    DIRECT_STREAM_EXTS, DOCUMENT_EXTS, IMAGE_EXTS, MEDIA_SOURCE_AUDIO_EXTS,
    MEDIA_SOURCE_VIDEO_EXTS, OBJECT_DOCUMENT_EXT, VIDEO_EXTS,
};
pub use dispatcher::strategy_plan;
pub use error::{RenderError, RenderErrorKind, ValidationError};
pub use file::{ByteRange, FileResource, MemoryFile};
pub use guard::check_length;
pub use host::{MediaHost, RenderCallback, RenderTarget};
pub use mime::{codec_hint, mime_type, mime_type_or_default};
pub use options::{RenderOptions, DEFAULT_MAX_RESOURCE_LENGTH};
pub use sniff::{is_ascii_text, sniff, Sniffed, SNIFF_END};
pub use static_render::IFRAME_SANDBOX;

pub use fos_media::Capabilities;
