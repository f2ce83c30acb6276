//! MIME Tables
//!
//! Extension to MIME type, and extension to the codec string the media
//! source strategy needs. Keys are lowercased extensions with their dot.

/// MIME type for a lowercased extension
pub fn mime_type(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        // Video
        ".mp4" | ".m4v" => "video/mp4",
        ".mkv" => "video/x-matroska",
        ".webm" => "video/webm",
        ".mov" => "video/quicktime",
        ".ogv" => "video/ogg",
        ".avi" => "video/x-msvideo",

        // Audio
        ".m4a" | ".m4b" | ".m4p" => "audio/mp4",
        ".mp3" => "audio/mpeg",
        ".aac" => "audio/aac",
        ".oga" | ".ogg" => "audio/ogg",
        ".wav" => "audio/wav",
        ".flac" => "audio/flac",
        ".opus" => "audio/opus",

        // Images
        ".bmp" => "image/bmp",
        ".gif" => "image/gif",
        ".jpeg" | ".jpg" => "image/jpeg",
        ".png" => "image/png",
        ".svg" => "image/svg+xml",
        ".webp" => "image/webp",
        ".ico" => "image/x-icon",

        // Documents
        ".css" => "text/css",
        ".html" | ".htm" => "text/html",
        ".js" => "application/javascript",
        ".json" => "application/json",
        ".md" => "text/markdown",
        ".pdf" => "application/pdf",
        ".srt" => "application/x-subrip",
        ".txt" => "text/plain",
        ".xml" => "application/xml",

        _ => return None,
    };
    Some(mime)
}

/// MIME type for an extension, `application/octet-stream` when unknown
pub fn mime_type_or_default(extension: &str) -> &'static str {
    mime_type(extension).unwrap_or("application/octet-stream")
}

/// Codec string for `MediaSource::add_source_buffer`
pub fn codec_hint(extension: &str) -> Option<&'static str> {
    let codec = match extension {
        ".m4a" | ".m4b" | ".m4p" => "audio/mp4; codecs=\"mp4a.40.5\"",
        ".m4v" | ".mp4" => "video/mp4; codecs=\"avc1.640029, mp4a.40.5\"",
        ".mkv" => "video/webm; codecs=\"avc1.640029, mp4a.40.5\"",
        ".mp3" => "audio/mpeg",
        ".webm" => "video/webm; codecs=\"vorbis, vp8\"",
        _ => return None,
    };
    Some(codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{
        AUDIO_EXTS, DOCUMENT_EXTS, IMAGE_EXTS, MEDIA_SOURCE_AUDIO_EXTS, MEDIA_SOURCE_VIDEO_EXTS,
        VIDEO_EXTS,
    };
    use fos_media::MediaSource;

    #[test]
    fn test_every_classified_extension_has_a_mime_type() {
        let tables = [
            MEDIA_SOURCE_VIDEO_EXTS,
            MEDIA_SOURCE_AUDIO_EXTS,
            VIDEO_EXTS,
            AUDIO_EXTS,
            IMAGE_EXTS,
            DOCUMENT_EXTS,
        ];
        for ext in tables.iter().flat_map(|t| t.iter()) {
            assert!(mime_type(ext).is_some(), "{ext} has no MIME type");
        }
    }

    #[test]
    fn test_media_source_extensions_have_supported_codecs() {
        for ext in MEDIA_SOURCE_VIDEO_EXTS.iter().chain(MEDIA_SOURCE_AUDIO_EXTS) {
            let codec = codec_hint(ext).unwrap_or_else(|| panic!("{ext} has no codec hint"));
            assert!(MediaSource::is_type_supported(codec), "{codec} is rejected by MSE");
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(mime_type(".mp4"), Some("video/mp4"));
        assert_eq!(mime_type(".MP4"), None);
        assert_eq!(mime_type_or_default(".xyz"), "application/octet-stream");
        assert_eq!(codec_hint(".mov"), None);
    }
}
