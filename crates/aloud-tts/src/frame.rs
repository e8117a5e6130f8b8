//! Inbound frame classification.
//!
//! The upstream interleaves text frames (pseudo-headers + body) and binary
//! frames (sub-header + audio payload) in server-driven order; this module
//! decodes both without assuming any ordering between them.

use std::collections::HashMap;

use serde::Deserialize;

use aloud_core::error::{AloudError, Result};

/// Marker terminating the sub-header of a binary audio frame. The audio
/// payload is everything after it.
pub const AUDIO_PAYLOAD_MARKER: &[u8] = b"Path:audio\r\n";

/// A classified inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    /// Synthesis turn has begun; binary audio frames that follow belong to it.
    TurnStart,
    /// Synthesis turn is complete.
    TurnEnd,
    /// Word/sentence boundary events for the subtitle tracks.
    Metadata(Vec<BoundaryEvent>),
    /// Unrecognized `path` value, ignored for forward compatibility.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// A timed association between synthesized audio and a span of source text.
/// Offsets and durations are in 100-nanosecond ticks from synthesis start.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryEvent {
    pub kind: BoundaryKind,
    pub offset_ticks: u64,
    pub duration_ticks: u64,
    pub text: String,
}

#[derive(Deserialize)]
struct MetadataPayload {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataEntry>,
}

#[derive(Deserialize)]
struct MetadataEntry {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Data")]
    data: MetadataData,
}

#[derive(Deserialize)]
struct MetadataData {
    #[serde(rename = "Offset")]
    offset: u64,
    #[serde(rename = "Duration", default)]
    duration: u64,
    #[serde(rename = "text")]
    text: MetadataText,
}

#[derive(Deserialize)]
struct MetadataText {
    #[serde(rename = "Text")]
    text: String,
}

/// Parse a text frame's pseudo-header block into lowercased keys.
fn parse_headers(block: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in block.split("\r\n") {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.to_ascii_lowercase(), value.to_string());
        }
    }
    headers
}

/// Classify an inbound text frame by its `path` pseudo-header.
pub fn parse_text_frame(data: &str) -> Result<ServerFrame> {
    let Some((header_block, body)) = data.split_once("\r\n\r\n") else {
        return Err(AloudError::Frame(
            "text frame missing header terminator".into(),
        ));
    };

    let headers = parse_headers(header_block);
    match headers.get("path").map(String::as_str) {
        Some("turn.start") => Ok(ServerFrame::TurnStart),
        Some("turn.end") => Ok(ServerFrame::TurnEnd),
        Some("audio.metadata") => {
            let payload: MetadataPayload = serde_json::from_str(body)
                .map_err(|e| AloudError::Frame(format!("bad audio.metadata body: {e}")))?;

            let events = payload
                .metadata
                .into_iter()
                .filter_map(|entry| {
                    let kind = match entry.kind.as_str() {
                        "WordBoundary" => BoundaryKind::Word,
                        "SentenceBoundary" => BoundaryKind::Sentence,
                        _ => return None,
                    };
                    Some(BoundaryEvent {
                        kind,
                        offset_ticks: entry.data.offset,
                        duration_ticks: entry.data.duration,
                        text: entry.data.text.text,
                    })
                })
                .collect();

            Ok(ServerFrame::Metadata(events))
        }
        _ => Ok(ServerFrame::Other),
    }
}

/// Slice the audio payload out of a binary frame: everything after the
/// `Path:audio\r\n` marker, located by byte-sequence search. Frames
/// without the marker yield nothing.
pub fn audio_payload(frame: &[u8]) -> Option<&[u8]> {
    frame
        .windows(AUDIO_PAYLOAD_MARKER.len())
        .position(|window| window == AUDIO_PAYLOAD_MARKER)
        .map(|pos| &frame[pos + AUDIO_PAYLOAD_MARKER.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_control_frames() {
        let frame = parse_text_frame("X-RequestId:abc\r\nPath:turn.start\r\n\r\n{}").unwrap();
        assert_eq!(frame, ServerFrame::TurnStart);

        let frame = parse_text_frame("Path:turn.end\r\n\r\n").unwrap();
        assert_eq!(frame, ServerFrame::TurnEnd);
    }

    #[test]
    fn test_header_keys_case_normalized() {
        let frame = parse_text_frame("PATH:turn.start\r\n\r\n").unwrap();
        assert_eq!(frame, ServerFrame::TurnStart);
    }

    #[test]
    fn test_unknown_path_ignored() {
        let frame = parse_text_frame("Path:response\r\n\r\n{\"status\":200}").unwrap();
        assert_eq!(frame, ServerFrame::Other);

        let frame = parse_text_frame("Content-Type:application/json\r\n\r\n{}").unwrap();
        assert_eq!(frame, ServerFrame::Other);
    }

    #[test]
    fn test_missing_terminator_is_frame_error() {
        let err = parse_text_frame("Path:turn.start").unwrap_err();
        assert!(matches!(err, AloudError::Frame(_)));
    }

    #[test]
    fn test_metadata_frame() {
        let body = r#"{
            "Metadata": [
                {
                    "Type": "WordBoundary",
                    "Data": {
                        "Offset": 1000000,
                        "Duration": 5000000,
                        "text": { "Text": "hello", "Length": 5, "BoundaryType": "WordBoundary" }
                    }
                },
                {
                    "Type": "SentenceBoundary",
                    "Data": {
                        "Offset": 1000000,
                        "Duration": 9000000,
                        "text": { "Text": "hello world", "Length": 11, "BoundaryType": "SentenceBoundary" }
                    }
                },
                {
                    "Type": "SessionEnd",
                    "Data": {
                        "Offset": 9999999,
                        "text": { "Text": "" }
                    }
                }
            ]
        }"#;
        let frame =
            parse_text_frame(&format!("Path:audio.metadata\r\n\r\n{body}")).unwrap();

        let ServerFrame::Metadata(events) = frame else {
            panic!("expected metadata frame");
        };
        // Unknown boundary types are skipped, not errors
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, BoundaryKind::Word);
        assert_eq!(events[0].offset_ticks, 1_000_000);
        assert_eq!(events[0].duration_ticks, 5_000_000);
        assert_eq!(events[0].text, "hello");
        assert_eq!(events[1].kind, BoundaryKind::Sentence);
    }

    #[test]
    fn test_metadata_bad_json_is_frame_error() {
        let err = parse_text_frame("Path:audio.metadata\r\n\r\nnot json").unwrap_err();
        assert!(matches!(err, AloudError::Frame(_)));
    }

    #[test]
    fn test_audio_payload_extraction() {
        let mut frame = Vec::new();
        frame.extend_from_slice(b"X-RequestId:abc\r\nContent-Type:audio/mpeg\r\nPath:audio\r\n");
        frame.extend_from_slice(&[0xff, 0xf3, 0x01, 0x02]);

        assert_eq!(audio_payload(&frame), Some(&[0xff, 0xf3, 0x01, 0x02][..]));
    }

    #[test]
    fn test_audio_payload_empty_after_marker() {
        assert_eq!(audio_payload(b"Path:audio\r\n"), Some(&b""[..]));
    }

    #[test]
    fn test_audio_payload_missing_marker() {
        assert_eq!(audio_payload(b"no marker here"), None);
        assert_eq!(audio_payload(b""), None);
        // A truncated marker must not match
        assert_eq!(audio_payload(b"Path:audio"), None);
    }
}
