//! Outbound session protocol — endpoint constants and the two text frames
//! sent at the start of every synthesis turn.

use std::fmt;
use std::str::FromStr;

use aloud_core::error::AloudError;

/// Client token the read-aloud endpoints require on every request.
pub const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// Origin header expected by the upstream service (the Edge read-aloud
/// browser extension).
pub const ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.77 Safari/537.36 Edg/91.0.864.41";

/// Default synthesis WebSocket endpoint (already carries the client token;
/// a per-attempt `ConnectionId` is appended on connect).
pub fn synth_endpoint() -> String {
    format!(
        "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1?TrustedClientToken={TRUSTED_CLIENT_TOKEN}"
    )
}

/// Default voice catalog endpoint.
pub fn voices_endpoint() -> String {
    format!(
        "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/voices/list?trustedclienttoken={TRUSTED_CLIENT_TOKEN}"
    )
}

/// Audio output format identifiers accepted by the upstream service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Audio24Khz48KbitrateMonoMp3,
    Audio24Khz96KbitrateMonoMp3,
    Audio16Khz32KbitrateMonoMp3,
    Audio16Khz64KbitrateMonoMp3,
    Audio16Khz128KbitrateMonoMp3,
    Webm24Khz16BitMonoOpus,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio24Khz48KbitrateMonoMp3 => "audio-24khz-48kbitrate-mono-mp3",
            Self::Audio24Khz96KbitrateMonoMp3 => "audio-24khz-96kbitrate-mono-mp3",
            Self::Audio16Khz32KbitrateMonoMp3 => "audio-16khz-32kbitrate-mono-mp3",
            Self::Audio16Khz64KbitrateMonoMp3 => "audio-16khz-64kbitrate-mono-mp3",
            Self::Audio16Khz128KbitrateMonoMp3 => "audio-16khz-128kbitrate-mono-mp3",
            Self::Webm24Khz16BitMonoOpus => "webm-24khz-16bit-mono-opus",
        }
    }

    /// MIME type of the audio payload this format produces.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Webm24Khz16BitMonoOpus => "audio/webm",
            _ => "audio/mpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = AloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio-24khz-48kbitrate-mono-mp3" => Ok(Self::Audio24Khz48KbitrateMonoMp3),
            "audio-24khz-96kbitrate-mono-mp3" => Ok(Self::Audio24Khz96KbitrateMonoMp3),
            "audio-16khz-32kbitrate-mono-mp3" => Ok(Self::Audio16Khz32KbitrateMonoMp3),
            "audio-16khz-64kbitrate-mono-mp3" => Ok(Self::Audio16Khz64KbitrateMonoMp3),
            "audio-16khz-128kbitrate-mono-mp3" => Ok(Self::Audio16Khz128KbitrateMonoMp3),
            "webm-24khz-16bit-mono-opus" => Ok(Self::Webm24Khz16BitMonoOpus),
            other => Err(AloudError::Config(format!("unknown output format: {other}"))),
        }
    }
}

/// A fresh v4 UUID with separators stripped (lowercase hex). Used for both
/// the handshake `ConnectionId` and the `X-RequestId` header.
pub fn connect_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Wall-clock timestamp in the JS `Date.toString()` shape the upstream
/// expects in `X-Timestamp` headers.
pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

/// First outbound frame of a turn: enables word and sentence boundary
/// metadata and selects the output format.
pub fn speech_config_frame(timestamp: &str, format: OutputFormat) -> String {
    let config = serde_json::json!({
        "context": {
            "synthesis": {
                "audio": {
                    "metadataoptions": {
                        "sentenceBoundaryEnabled": true,
                        "wordBoundaryEnabled": true,
                    },
                    "outputFormat": format.as_str(),
                }
            }
        }
    });

    format!(
        "X-Timestamp:{timestamp}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n{config}\r\n"
    )
}

/// Second outbound frame of a turn: the SSML document.
///
/// The trailing `Z` on `X-Timestamp` lands on an already-localized
/// timestamp; the upstream service requires the exact byte shape.
pub fn ssml_frame(request_id: &str, timestamp: &str, ssml: &str) -> String {
    format!(
        "X-RequestId:{request_id}\r\n\
         Content-Type:application/ssml+xml\r\n\
         X-Timestamp:{timestamp}Z\r\n\
         Path:ssml\r\n\r\n{ssml}"
    )
}

/// SSML document wrapping the input text. Pitch is fixed; rate and volume
/// are pass-through prosody deltas.
pub fn build_ssml(text: &str, voice: &str, rate: &str, volume: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{voice}'><prosody pitch='+0Hz' rate='{rate}' volume='{volume}'>{text}</prosody>\
         </voice></speak>"
    )
}
