//! Synthesis orchestrator — drives one protocol turn end-to-end.

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use aloud_core::config::TtsConfig;
use aloud_core::error::{AloudError, Result};

use crate::connection::{ChannelSlot, WsChannel};
use crate::frame::{self, BoundaryKind, ServerFrame};
use crate::protocol::{self, OutputFormat};
use crate::submaker::SubMaker;

/// One synthesis request. Immutable once sent.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    pub format: OutputFormat,
    pub rate: String,
    pub volume: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            format: OutputFormat::default(),
            rate: "+0%".into(),
            volume: "+0%".into(),
        }
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = rate.into();
        self
    }

    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = volume.into();
        self
    }
}

/// Aggregated output of one completed turn. All-or-nothing: a turn that
/// aborts early produces an error, never a partial result.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Audio payload fragments in arrival order.
    pub audio: Vec<Vec<u8>>,
    /// WEBVTT track built from word boundary events.
    pub word_subtitle: String,
    /// WEBVTT track built from sentence boundary events.
    pub sentence_subtitle: String,
}

impl SynthesisResult {
    /// Concatenate the audio fragments into one buffer.
    pub fn audio_bytes(&self) -> Vec<u8> {
        self.audio.concat()
    }
}

/// Shared synthesis client. Cheap to share behind an `Arc`; concurrent
/// `synthesize` calls queue on the channel slot and run one turn at a time.
pub struct Synthesizer {
    channel: ChannelSlot,
    overlap_seconds: f64,
}

impl Synthesizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            channel: ChannelSlot::new(endpoint),
            overlap_seconds: 0.0,
        }
    }

    pub fn with_overlap(mut self, overlap_seconds: f64) -> Self {
        self.overlap_seconds = overlap_seconds;
        self
    }

    pub fn from_config(config: Option<&TtsConfig>) -> Self {
        let endpoint = config
            .and_then(|t| t.endpoint.clone())
            .unwrap_or_else(protocol::synth_endpoint);
        let overlap = config.and_then(|t| t.overlap_seconds).unwrap_or(0.0);
        Self::new(endpoint).with_overlap(overlap)
    }

    /// Run one complete synthesis turn.
    ///
    /// Acquires the shared channel (handshaking if needed), sends the
    /// speech.config and SSML frames, then consumes inbound frames until
    /// `turn.end`. A channel close or error before that point fails the
    /// call with `Synthesis` and invalidates the cached channel so the
    /// next call re-handshakes.
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesisResult> {
        let mut guard = self.channel.acquire().await?;
        let Some(ws) = guard.as_mut() else {
            return Err(AloudError::Connection("channel slot empty after acquire".into()));
        };

        let outcome = self.run_turn(ws, request).await;
        if outcome.is_err() {
            *guard = None;
        }
        outcome
    }

    async fn run_turn(&self, ws: &mut WsChannel, request: &SpeechRequest) -> Result<SynthesisResult> {
        let timestamp = protocol::timestamp();
        let request_id = protocol::connect_id();

        debug!(
            %request_id,
            voice = %request.voice,
            format = %request.format,
            text_len = request.text.len(),
            "Starting synthesis turn"
        );

        ws.send(Message::text(protocol::speech_config_frame(
            &timestamp,
            request.format,
        )))
        .await
        .map_err(|e| AloudError::Synthesis(format!("failed to send speech.config: {e}")))?;

        let ssml = protocol::build_ssml(&request.text, &request.voice, &request.rate, &request.volume);
        ws.send(Message::text(protocol::ssml_frame(
            &request_id,
            &timestamp,
            &ssml,
        )))
        .await
        .map_err(|e| AloudError::Synthesis(format!("failed to send ssml: {e}")))?;

        let mut word_track = SubMaker::with_overlap(self.overlap_seconds);
        let mut sentence_track = SubMaker::with_overlap(self.overlap_seconds);
        let mut audio: Vec<Vec<u8>> = Vec::new();
        let mut accepting_audio = false;

        while let Some(next) = ws.next().await {
            let msg = next
                .map_err(|e| AloudError::Synthesis(format!("channel error mid-turn: {e}")))?;

            match msg {
                Message::Text(text) => match frame::parse_text_frame(text.as_str()) {
                    Ok(ServerFrame::TurnStart) => accepting_audio = true,
                    Ok(ServerFrame::TurnEnd) => {
                        debug!(%request_id, chunks = audio.len(), "Turn completed");
                        return Ok(SynthesisResult {
                            audio,
                            word_subtitle: word_track.generate(),
                            sentence_subtitle: sentence_track.generate(),
                        });
                    }
                    Ok(ServerFrame::Metadata(events)) => {
                        for event in events {
                            let track = match event.kind {
                                BoundaryKind::Word => &mut word_track,
                                BoundaryKind::Sentence => &mut sentence_track,
                            };
                            track.push(event.offset_ticks, event.duration_ticks, &event.text);
                        }
                    }
                    Ok(ServerFrame::Other) => {}
                    Err(e) => warn!(%e, "Dropping malformed text frame"),
                },
                Message::Binary(data) => {
                    if accepting_audio {
                        if let Some(payload) = frame::audio_payload(&data) {
                            audio.push(payload.to_vec());
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }

        Err(AloudError::Synthesis(
            "channel closed before turn completed".into(),
        ))
    }
}
