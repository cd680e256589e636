use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use super::CaptionEntry;

// @module: Timed-text payload parsing and text assembly

const TEXT_ELEMENT: &[u8] = b"text";

/// Parse a timed-text payload into caption entries in document order
///
/// Each `<text start=".." dur="..">` element becomes one entry. Missing or
/// non-numeric timing attributes read as `0`, empty elements are kept. An
/// element still open when the payload ends is kept with the text read so
/// far. Only a malformed document fails the whole batch.
pub fn parse_timed_text(xml: &str) -> Result<Vec<CaptionEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<CaptionEntry> = None;

    loop {
        match reader.read_event()? {
            Event::Eof => {
                if let Some(unclosed) = current.take() {
                    warn!("Caption payload ended inside a <text> element");
                    entries.push(unclosed);
                }
                break;
            }
            Event::Start(e) if e.local_name().as_ref() == TEXT_ELEMENT => {
                if let Some(unclosed) = current.take() {
                    entries.push(unclosed);
                }
                current = Some(entry_from_attributes(&e));
            }
            Event::Empty(e) if e.local_name().as_ref() == TEXT_ELEMENT => {
                entries.push(entry_from_attributes(&e));
            }
            Event::Text(t) => {
                if let Some(entry) = current.as_mut() {
                    let text = t.unescape().unwrap_or_else(|e| {
                        warn!("Keeping raw caption text after unescape failure: {}", e);
                        Cow::Owned(String::from_utf8_lossy(&t).into_owned())
                    });
                    entry.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(entry) = current.as_mut() {
                    entry.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) if e.local_name().as_ref() == TEXT_ELEMENT => {
                if let Some(entry) = current.take() {
                    entries.push(entry);
                }
            }
            _ => {}
        }
    }

    debug!("Parsed {} caption entries", entries.len());
    Ok(entries)
}

fn entry_from_attributes(element: &BytesStart) -> CaptionEntry {
    let mut start = None;
    let mut duration = None;

    for attr in element.attributes().flatten() {
        let value = attr.unescape_value().ok();
        match attr.key.as_ref() {
            b"start" => start = value,
            b"dur" => duration = value,
            _ => {}
        }
    }

    CaptionEntry::new(
        lenient_seconds(start.as_deref()),
        lenient_seconds(duration.as_deref()),
        String::new(),
    )
}

/// Parse seconds, treating missing, non-numeric and non-finite values as `0`
fn lenient_seconds(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Join entry texts with newlines, keeping the given order
pub fn assemble_text(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format seconds as `HH:MM:SS`, dropping the fractional part
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// One `[HH:MM:SS] text` line per entry
pub fn render_with_timestamps(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("[{}] {}", format_timestamp(entry.start_seconds), entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}
