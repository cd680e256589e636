use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::CaptionTrack;
use crate::errors::ExtractionFailure;

// @module: Caption track extraction and selection

// @const: Player response assignment in an inline script.
// Best-effort scan: non-greedy up to the first `}` followed by `;`, single line.
// Breaks if the site changes how it embeds player data.
static PLAYER_RESPONSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ytInitialPlayerResponse\s*=\s*(\{.+?\})\s*;").unwrap()
});

/// Language codes preferred during track selection
pub const PREFERRED_LANGUAGES: [&str; 3] = ["zh-TW", "zh-CN", "en"];

/// Track object as it appears in `captionTracks`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    language_code: String,
    base_url: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_default: Option<bool>,
    #[serde(default)]
    name: Option<Value>,
}

impl From<RawTrack> for CaptionTrack {
    fn from(raw: RawTrack) -> Self {
        CaptionTrack {
            language_code: raw.language_code,
            base_url: raw.base_url,
            kind: raw.kind.unwrap_or_default(),
            is_default: raw.is_default.unwrap_or(false),
            name: raw.name.as_ref().and_then(track_label),
        }
    }
}

/// Label from `{"simpleText": ..}` or `{"runs": [{"text": ..}]}`
fn track_label(name: &Value) -> Option<String> {
    name.get("simpleText")
        .and_then(Value::as_str)
        .or_else(|| {
            name.get("runs")?
                .as_array()?
                .first()?
                .get("text")?
                .as_str()
        })
        .map(str::to_string)
}

/// Extract the caption track list from watch page markup
///
/// Fails only when the player response is missing or is not JSON. A player
/// response without captions yields an empty list; the missing step is logged.
pub fn extract_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, ExtractionFailure> {
    let literal = PLAYER_RESPONSE_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ExtractionFailure::AssignmentNotFound)?;

    let data: Value = serde_json::from_str(literal)
        .map_err(|e| ExtractionFailure::InvalidJson(e.to_string()))?;

    let Some(captions) = data.get("captions") else {
        debug!("Player response has no 'captions' object");
        return Ok(Vec::new());
    };
    let Some(renderer) = captions.get("playerCaptionsTracklistRenderer") else {
        debug!("Captions have no 'playerCaptionsTracklistRenderer'");
        return Ok(Vec::new());
    };
    let Some(raw_tracks) = renderer.get("captionTracks").and_then(Value::as_array) else {
        debug!("Tracklist renderer has no 'captionTracks' array");
        return Ok(Vec::new());
    };

    let tracks = raw_tracks
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match RawTrack::deserialize(value) {
            Ok(raw) => Some(CaptionTrack::from(raw)),
            Err(e) => {
                warn!("Skipping caption track {}: {}", index, e);
                None
            }
        })
        .collect::<Vec<_>>();

    debug!("Extracted {} caption track(s)", tracks.len());
    Ok(tracks)
}

/// Pick the track to summarize
///
/// Returns the first track, in list order, whose language is in
/// [`PREFERRED_LANGUAGES`]. Membership only: a `zh-TW` track later in the list
/// does not beat an earlier `en` one. Falls back to the first track.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|track| PREFERRED_LANGUAGES.contains(&track.language_code.as_str()))
        .or_else(|| tracks.first())
}
