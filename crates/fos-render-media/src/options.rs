//! Render Options

use serde::Deserialize;

/// Largest resource the blob strategies will copy into memory
pub const DEFAULT_MAX_RESOURCE_LENGTH: u64 = 200_000_000;

/// Options for one render
///
/// Missing fields take their defaults and unknown fields are ignored when
/// deserializing, so option objects written for other renderers parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Start playback once data begins loading
    pub autoplay: bool,
    pub muted: bool,
    /// Show native playback controls
    pub controls: bool,
    /// Upper bound for whole-resource materialization of audio/video
    #[serde(alias = "maxBlobLength")]
    pub max_resource_length: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            muted: false,
            controls: true,
            max_resource_length: DEFAULT_MAX_RESOURCE_LENGTH,
        }
    }
}

impl RenderOptions {
    /// Parse options from a JSON object
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn with_controls(mut self, controls: bool) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_max_resource_length(mut self, max: u64) -> Self {
        self.max_resource_length = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RenderOptions::default();
        assert!(!opts.autoplay);
        assert!(!opts.muted);
        assert!(opts.controls);
        assert_eq!(opts.max_resource_length, 200_000_000);
    }

    #[test]
    fn test_json_fills_missing_and_ignores_unknown() {
        let opts = RenderOptions::from_json(r#"{"autoplay": true, "poster": "x.png"}"#).unwrap();
        assert!(opts.autoplay);
        assert!(opts.controls);
        assert_eq!(opts.max_resource_length, DEFAULT_MAX_RESOURCE_LENGTH);

        let opts = RenderOptions::from_json("{}").unwrap();
        assert_eq!(opts, RenderOptions::default());
    }

    #[test]
    fn test_json_keys() {
        let opts = RenderOptions::from_json(r#"{"maxResourceLength": 10, "controls": false}"#).unwrap();
        assert_eq!(opts.max_resource_length, 10);
        assert!(!opts.controls);

        let opts = RenderOptions::from_json(r#"{"maxBlobLength": 20}"#).unwrap();
        assert_eq!(opts.max_resource_length, 20);

        assert!(RenderOptions::from_json(r#"{"muted": "yes"}"#).is_err());
    }
}
