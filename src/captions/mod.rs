/*!
 * Caption track discovery and timed-text processing.
 *
 * - `tracks`: Pulls the caption track list out of watch page markup and picks one
 * - `timedtext`: Parses timed-text payloads and joins them into plain text
 * - `source`: Fetches watch pages and payloads for a video
 */

use serde::{Deserialize, Serialize};

pub mod source;
pub mod timedtext;
pub mod tracks;

pub use source::CaptionSource;
pub use timedtext::{assemble_text, format_timestamp, parse_timed_text, render_with_timestamps};
pub use tracks::{extract_caption_tracks, select_track, PREFERRED_LANGUAGES};

/// One selectable caption stream of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language code as listed by the page (e.g. "en", "zh-TW")
    pub language_code: String,

    /// URL of the timed-text payload
    pub base_url: String,

    /// Track kind; "asr" for auto-generated captions, empty otherwise
    pub kind: String,

    /// Whether the page marks this track as the default
    pub is_default: bool,

    /// Human-readable label shown by the player
    pub name: Option<String>,
}

impl CaptionTrack {
    /// Create a manual, non-default track
    pub fn new(language_code: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            base_url: base_url.into(),
            kind: String::new(),
            is_default: false,
            name: None,
        }
    }

    /// Whether the captions were generated by speech recognition
    pub fn is_auto_generated(&self) -> bool {
        self.kind == "asr"
    }
}

/// One timed caption unit
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    /// Offset from the start of the video, in seconds
    pub start_seconds: f64,

    /// How long the caption is shown, in seconds
    pub duration_seconds: f64,

    /// Caption text
    pub text: String,
}

impl CaptionEntry {
    /// Create a new caption entry
    pub fn new(start_seconds: f64, duration_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            duration_seconds,
            text: text.into(),
        }
    }
}
