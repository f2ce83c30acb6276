//! Media Elements
//!
//! Playback state shared by `<video>` and `<audio>`.

use crate::MediaError;

/// Network state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetworkState {
    #[default]
    Empty = 0,
    Idle = 1,
    Loading = 2,
    NoSource = 3,
}

/// Ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

/// MediaError as exposed on the element (`element.error`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaElementError {
    pub code: MediaErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
}

/// Element flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Base media element (shared between video/audio)
#[derive(Debug, Clone)]
pub struct HTMLMediaElement {
    pub kind: MediaKind,

    // Source
    pub src: String,
    /// Bumped by every `load()`; events from older sources are stale
    pub generation: u32,

    // State
    pub network_state: NetworkState,
    pub ready_state: ReadyState,
    pub error: Option<MediaElementError>,

    // Playback
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    pub autoplay: bool,

    // Presentation
    pub muted: bool,
    pub controls: bool,
}

impl HTMLMediaElement {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            src: String::new(),
            generation: 0,
            network_state: NetworkState::Empty,
            ready_state: ReadyState::HaveNothing,
            error: None,
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            autoplay: false,
            muted: false,
            controls: false,
        }
    }

    pub fn video() -> Self {
        Self::new(MediaKind::Video)
    }

    pub fn audio() -> Self {
        Self::new(MediaKind::Audio)
    }

    /// Media element load algorithm: drop the previous source's state and
    /// start a new source generation.
    pub fn load(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.network_state = NetworkState::Loading;
        self.ready_state = ReadyState::HaveNothing;
        self.error = None;
        self.current_time = 0.0;
        self.duration = f64::NAN;
        self.paused = true;
        self.generation
    }

    /// Assign a URL source and run the load algorithm
    pub fn set_src(&mut self, src: &str) -> u32 {
        self.src = src.to_string();
        self.load()
    }

    /// Play media
    ///
    /// Playing before data arrived is allowed (the request stays pending);
    /// an element without a usable source refuses.
    pub fn play(&mut self) -> Result<(), MediaError> {
        if let Some(error) = &self.error {
            return Err(MediaError::NotAllowed(error.message.clone()));
        }
        if matches!(self.network_state, NetworkState::Empty | NetworkState::NoSource) {
            return Err(MediaError::InvalidState("no source".into()));
        }
        self.paused = false;
        Ok(())
    }

    /// Pause media
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Seek to time (seconds). Clamped to the duration once it is known.
    pub fn seek(&mut self, time: f64) {
        if !time.is_finite() {
            return;
        }
        let mut time = time.max(0.0);
        if self.duration.is_finite() {
            time = time.min(self.duration);
        }
        self.current_time = time;
    }

    /// Record a fatal media error
    pub fn fail(&mut self, code: MediaErrorCode, message: impl Into<String>) {
        self.error = Some(MediaElementError {
            code,
            message: message.into(),
        });
        self.network_state = NetworkState::Idle;
        self.paused = true;
    }
}
