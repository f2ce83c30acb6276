//! Container Probing
//!
//! Recognizes media containers from their leading bytes.

/// Bytes needed for a definite answer
pub const PROBE_LEN: usize = 12;

/// Media container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// ISO base media (mp4, m4a, m4v)
    Mp4,
    /// ISO base media with the `qt  ` brand
    QuickTime,
    /// EBML: Matroska and WebM
    Matroska,
    Mp3,
    /// ADTS framed AAC
    Aac,
    Ogg,
    Wav,
    Flac,
}

impl Container {
    /// Identify the container from the start of the resource
    pub fn probe(header: &[u8]) -> Option<Self> {
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            return Some(if &header[8..12] == b"qt  " { Self::QuickTime } else { Self::Mp4 });
        }
        if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(Self::Matroska);
        }
        if header.starts_with(b"OggS") {
            return Some(Self::Ogg);
        }
        if header.starts_with(b"fLaC") {
            return Some(Self::Flac);
        }
        if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WAVE" {
            return Some(Self::Wav);
        }
        if header.starts_with(b"ID3") {
            return Some(Self::Mp3);
        }
        // MPEG audio frame sync: 11 set bits, then the layer decides
        if let [0xFF, second, ..] = header {
            if second & 0xE0 == 0xE0 {
                return Some(if second & 0x06 == 0 { Self::Aac } else { Self::Mp3 });
            }
        }
        None
    }

    /// MIME essence used when this container is fed through MSE
    pub fn mse_essences(&self) -> &'static [&'static str] {
        match self {
            Self::Mp4 => &["video/mp4", "audio/mp4"],
            Self::Matroska => &["video/webm", "audio/webm"],
            Self::Mp3 => &["audio/mpeg"],
            Self::QuickTime | Self::Aac | Self::Ogg | Self::Wav | Self::Flac => &[],
        }
    }
}
