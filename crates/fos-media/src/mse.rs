//! Media Source Extensions
//!
//! MSE API used to feed segmented data into a media element.

/// Media Source ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaSourceReadyState {
    #[default]
    Closed,
    Open,
    Ended,
}

/// Containers MSE accepts, by MIME essence
const CONTAINERS: &[&str] = &["video/mp4", "audio/mp4", "video/webm", "audio/webm", "audio/mpeg"];

/// Codec families MSE accepts, matched by prefix
const CODECS: &[&str] = &["avc1.", "mp4a.", "av01.", "vp8", "vp9", "vorbis", "opus"];

/// Media Source
#[derive(Debug)]
pub struct MediaSource {
    pub ready_state: MediaSourceReadyState,
    pub source_buffers: Vec<SourceBuffer>,
}

/// Source Buffer
#[derive(Debug)]
pub struct SourceBuffer {
    pub mime_type: String,
    appended_bytes: u64,
}

impl MediaSource {
    pub fn new() -> Self {
        Self {
            ready_state: MediaSourceReadyState::Closed,
            source_buffers: Vec::new(),
        }
    }

    /// Check if type is supported
    ///
    /// Accepts a bare container (`audio/mpeg`) or a container with a
    /// `codecs` parameter in which every codec is known.
    pub fn is_type_supported(mime_type: &str) -> bool {
        let mut parts = mime_type.split(';');
        let essence = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        if !CONTAINERS.contains(&essence.as_str()) {
            return false;
        }

        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                return false;
            };
            if !key.trim().eq_ignore_ascii_case("codecs") {
                continue;
            }
            let value = value.trim().trim_matches('"');
            let known = value
                .split(',')
                .map(str::trim)
                .all(|codec| !codec.is_empty() && CODECS.iter().any(|c| codec.starts_with(c)));
            if !known {
                return false;
            }
        }
        true
    }

    /// Attach to a media element (sourceopen)
    pub fn open(&mut self) -> Result<(), MseError> {
        if self.ready_state != MediaSourceReadyState::Closed {
            return Err(MseError::InvalidState);
        }
        self.ready_state = MediaSourceReadyState::Open;
        Ok(())
    }

    /// Add source buffer
    pub fn add_source_buffer(&mut self, mime_type: &str) -> Result<usize, MseError> {
        if self.ready_state != MediaSourceReadyState::Open {
            return Err(MseError::InvalidState);
        }

        if !Self::is_type_supported(mime_type) {
            return Err(MseError::NotSupported(mime_type.to_string()));
        }

        self.source_buffers.push(SourceBuffer::new(mime_type));
        Ok(self.source_buffers.len() - 1)
    }

    /// Append a segment to one of the source buffers
    pub fn append_buffer(&mut self, index: usize, data: &[u8]) -> Result<(), MseError> {
        if self.ready_state != MediaSourceReadyState::Open {
            return Err(MseError::InvalidState);
        }
        self.source_buffers
            .get_mut(index)
            .ok_or(MseError::InvalidState)?
            .append_buffer(data);
        Ok(())
    }

    /// End of stream
    pub fn end_of_stream(&mut self) -> Result<(), MseError> {
        if self.ready_state != MediaSourceReadyState::Open {
            return Err(MseError::InvalidState);
        }
        self.ready_state = MediaSourceReadyState::Ended;
        Ok(())
    }

    /// Detach from the media element
    pub fn close(&mut self) {
        self.ready_state = MediaSourceReadyState::Closed;
        self.source_buffers.clear();
    }
}

impl Default for MediaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceBuffer {
    pub fn new(mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            appended_bytes: 0,
        }
    }

    /// Append a segment
    pub fn append_buffer(&mut self, data: &[u8]) {
        self.appended_bytes += data.len() as u64;
    }

    /// Total bytes appended so far
    pub fn appended_bytes(&self) -> u64 {
        self.appended_bytes
    }
}

/// MSE error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MseError {
    #[error("MediaSource is not in the expected state")]
    InvalidState,
    #[error("Unsupported MIME type or codec: {0}")]
    NotSupported(String),
}
