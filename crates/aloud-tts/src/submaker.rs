//! WEBVTT caption track builder.
//!
//! Spans accumulate as raw `(start, end)` tick pairs plus the text exactly
//! as it arrived in metadata frames; escape sequences are resolved at
//! render time so the raw text stays available for diagnostics.

const TICKS_PER_HOUR: u64 = 60 * 60 * 10_000_000;
const TICKS_PER_MINUTE: u64 = 60 * 10_000_000;
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Accumulates timed text spans of one granularity (word or sentence) and
/// renders them as a WEBVTT document.
#[derive(Debug, Default)]
pub struct SubMaker {
    offsets: Vec<(u64, u64)>,
    subs: Vec<String>,
    /// Ticks added to every cue's end time at render time.
    overlap_ticks: u64,
}

impl SubMaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `overlap` is in seconds; stored as ticks.
    pub fn with_overlap(overlap: f64) -> Self {
        Self {
            overlap_ticks: (overlap * TICKS_PER_SECOND as f64) as u64,
            ..Self::default()
        }
    }

    /// Append one boundary event: the span covers
    /// `[offset, offset + duration)` and carries `text` verbatim.
    pub fn push(&mut self, offset_ticks: u64, duration_ticks: u64, text: &str) {
        self.offsets
            .push((offset_ticks, offset_ticks + duration_ticks));
        self.subs.push(text.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Render the track as a WEBVTT document.
    ///
    /// A text/time span count mismatch yields an empty string — callers
    /// treat empty as "no captions", not as a failure.
    pub fn generate(&self) -> String {
        if self.subs.len() != self.offsets.len() {
            return String::new();
        }

        let mut data = String::from("WEBVTT\r\n\r\n");
        for ((start, end), sub) in self.offsets.iter().zip(&self.subs) {
            data.push_str(&format!(
                "{} --> {}\r\n{}\r\n\r\n",
                format_time(*start),
                format_time(*end + self.overlap_ticks),
                unescape(sub),
            ));
        }
        data
    }
}

/// Resolve the `\&`, `\<`, `\>` escapes carried by metadata text.
pub fn unescape(input: &str) -> String {
    input
        .replace("\\&", "&")
        .replace("\\<", "<")
        .replace("\\>", ">")
}

/// Format a tick count (100 ns units) as `HH:MM:SS.fffffff`.
fn format_time(ticks: u64) -> String {
    let hours = ticks / TICKS_PER_HOUR;
    let minutes = (ticks % TICKS_PER_HOUR) / TICKS_PER_MINUTE;
    let seconds = (ticks % TICKS_PER_MINUTE) / TICKS_PER_SECOND;
    let fraction = ticks % TICKS_PER_SECOND;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{fraction:07}")
}
