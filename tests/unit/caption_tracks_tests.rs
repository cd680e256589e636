/*!
 * Tests for caption track extraction and selection
 */

use serde_json::json;
use ytcapsum::captions::{extract_caption_tracks, select_track, CaptionTrack};
use ytcapsum::errors::ExtractionFailure;

use crate::common;

fn tracks_of(codes: &[&str]) -> Vec<CaptionTrack> {
    codes
        .iter()
        .map(|code| CaptionTrack::new(*code, format!("https://example.test/{}", code)))
        .collect()
}

#[test]
fn test_extract_withTwoTracks_shouldKeepOrderAndFields() {
    let html = common::watch_page_with_tracks(&[
        ("en", "https://example.test/api/timedtext?lang=en".to_string()),
        ("zh-TW", "https://example.test/api/timedtext?lang=zh-TW".to_string()),
    ]);

    let tracks = extract_caption_tracks(&html).unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].language_code, "en");
    assert_eq!(tracks[0].base_url, "https://example.test/api/timedtext?lang=en");
    assert_eq!(tracks[0].name.as_deref(), Some("en"));
    assert_eq!(tracks[1].language_code, "zh-TW");
}

#[test]
fn test_extract_withAutoGeneratedTrack_shouldKeepKind() {
    let html = common::watch_page(&json!({
        "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [{
            "baseUrl": "https://example.test/asr",
            "name": {"runs": [{"text": "English (auto-generated)"}]},
            "languageCode": "en",
            "kind": "asr"
        }]}}
    }));

    let tracks = extract_caption_tracks(&html).unwrap();
    assert_eq!(tracks.len(), 1);
    assert!(tracks[0].is_auto_generated());
    assert_eq!(tracks[0].name.as_deref(), Some("English (auto-generated)"));
}

#[test]
fn test_extract_withoutAssignment_shouldFail() {
    let html = "<html><body><script>var somethingElse = {\"a\": 1};</script></body></html>";
    assert_eq!(
        extract_caption_tracks(html),
        Err(ExtractionFailure::AssignmentNotFound)
    );
}

#[test]
fn test_extract_withBrokenJson_shouldFail() {
    let html = "<script>var ytInitialPlayerResponse = {\"captions\": oops};</script>";
    assert!(matches!(
        extract_caption_tracks(html),
        Err(ExtractionFailure::InvalidJson(_))
    ));
}

#[test]
fn test_extract_withoutCaptions_shouldBeEmpty() {
    let no_captions = common::watch_page(&json!({"playabilityStatus": {"status": "OK"}}));
    assert_eq!(extract_caption_tracks(&no_captions), Ok(Vec::new()));

    let no_renderer = common::watch_page(&json!({"captions": {}}));
    assert_eq!(extract_caption_tracks(&no_renderer), Ok(Vec::new()));

    let no_tracks = common::watch_page(&json!({
        "captions": {"playerCaptionsTracklistRenderer": {"audioTracks": []}}
    }));
    assert_eq!(extract_caption_tracks(&no_tracks), Ok(Vec::new()));

    let empty_tracks = common::watch_page_with_tracks(&[]);
    assert_eq!(extract_caption_tracks(&empty_tracks), Ok(Vec::new()));
}

#[test]
fn test_extract_withIncompleteTrack_shouldSkipIt() {
    let html = common::watch_page(&json!({
        "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
            {"languageCode": "fr"},
            {"baseUrl": "https://example.test/de", "languageCode": "de"}
        ]}}
    }));

    let tracks = extract_caption_tracks(&html).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].language_code, "de");
}

#[test]
fn test_select_withPreferredLanguage_shouldPickIt() {
    let tracks = tracks_of(&["ja", "zh-TW", "ko"]);
    assert_eq!(select_track(&tracks).unwrap().language_code, "zh-TW");
}

#[test]
fn test_select_withSeveralPreferred_shouldPickFirstInListOrder() {
    let tracks = tracks_of(&["en", "ja", "zh-TW"]);
    assert_eq!(select_track(&tracks).unwrap().language_code, "en");

    let tracks = tracks_of(&["zh-CN", "zh-TW"]);
    assert_eq!(select_track(&tracks).unwrap().language_code, "zh-CN");
}

#[test]
fn test_select_withoutPreferred_shouldFallBackToFirst() {
    let tracks = tracks_of(&["ja", "ko"]);
    assert_eq!(select_track(&tracks).unwrap().language_code, "ja");
}

#[test]
fn test_select_withRegionVariant_shouldNotCountAsPreferred() {
    let tracks = tracks_of(&["ja", "en-GB"]);
    assert_eq!(select_track(&tracks).unwrap().language_code, "ja");
}

#[test]
fn test_select_withEmptyList_shouldBeNone() {
    assert!(select_track(&[]).is_none());
}
