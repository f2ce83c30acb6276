//! fOS Media
//!
//! Media APIs for the fOS browser engine.
//!
//! Features:
//! - HTMLVideoElement / HTMLAudioElement state
//! - Media Source Extensions
//! - Blob URLs for materialized resources
//! - Container probing and a pluggable playback engine

pub mod element;
pub mod mse;
pub mod blob;
pub mod container;
pub mod engine;

pub use element::{
    HTMLMediaElement, MediaKind, NetworkState, ReadyState, MediaElementError, MediaErrorCode,
};
pub use mse::{MediaSource, SourceBuffer, MediaSourceReadyState, MseError};
pub use blob::{Blob, BlobStore};
pub use container::Container;
pub use engine::{Capabilities, HeadlessEngine, PlaybackEngine, SourceKind};

/// Media error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// play() refused by the user agent (autoplay policy, errored element)
    #[error("Not allowed: {0}")]
    NotAllowed(String),
}
