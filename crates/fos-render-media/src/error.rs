//! Render Errors
//!
//! Validation errors are returned synchronously by `render`/`append`
//! before any resource is touched. Everything else reaches the caller
//! through the completion callback as a `RenderError`.

use std::io;

use fos_dom::{DomError, NodeId};
use fos_media::MediaError;

use crate::adapters::Strategy;

/// Malformed call: bad resource, bad target, bad parent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing or invalid file name")]
    MissingName,

    #[error("render target \"{0}\" does not exist")]
    TargetNotFound(String),

    #[error("render target {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Cannot render \"{extension}\" inside a \"{found}\" element, expected \"{expected}\"")]
    TagMismatch {
        extension: String,
        found: String,
        expected: &'static str,
    },

    #[error("cannot append into a \"{tag}\" element; the parent must be the container the new element is appended to")]
    InvalidParent { tag: String },
}

/// Final failure of a render, annotated with the file name
#[derive(Debug, thiserror::Error)]
#[error("Error rendering file \"{file_name}\": {kind}")]
pub struct RenderError {
    pub file_name: String,
    pub kind: RenderErrorKind,
}

impl RenderError {
    pub fn new(file_name: &str, kind: RenderErrorKind) -> Self {
        Self {
            file_name: file_name.to_string(),
            kind,
        }
    }

    pub fn kind(&self) -> &RenderErrorKind {
        &self.kind
    }
}

/// What went wrong
#[derive(Debug, thiserror::Error)]
pub enum RenderErrorKind {
    #[error("Unsupported file type \"{extension}\": Cannot append to DOM")]
    UnsupportedType { extension: String },

    #[error("File length too large for Blob URL approach: {length} (max: {max})")]
    ResourceTooLarge { length: u64, max: u64 },

    #[error("{strategy} playback failed: {message}")]
    Playback { strategy: Strategy, message: String },

    #[error("the element was given another source before playback started")]
    Superseded,

    #[error("autoplay was rejected: {0}")]
    AutoplayRejected(#[source] MediaError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
