//! Request handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use aloud_tts::{list_voices, OutputFormat, SpeechRequest};

use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct TtsQuery {
    text: Option<String>,
    voice: Option<String>,
    /// Response shape: "audio" (raw bytes, default) or "full" (JSON with
    /// base64 audio plus both subtitle tracks).
    format: Option<String>,
    rate: Option<String>,
    volume: Option<String>,
}

pub async fn tts_handler(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<TtsQuery>,
) -> Response {
    let Some(text) = query.text.filter(|t| !t.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "text is required"})),
        )
            .into_response();
    };

    let tts = state.config.tts.as_ref();
    let output_format = tts
        .and_then(|t| t.output_format.as_deref())
        .map(str::parse::<OutputFormat>)
        .transpose()
        .unwrap_or_else(|e| {
            warn!(%e, "Ignoring bad configured output format");
            None
        })
        .unwrap_or_default();

    let voice = query.voice.unwrap_or_else(|| state.config.default_voice());
    let mut request = SpeechRequest::new(text, voice).format(output_format);
    if let Some(rate) = query.rate.or_else(|| tts.and_then(|t| t.rate.clone())) {
        request = request.rate(rate);
    }
    if let Some(volume) = query.volume.or_else(|| tts.and_then(|t| t.volume.clone())) {
        request = request.volume(volume);
    }

    let result = match state.synthesizer.synthesize(&request).await {
        Ok(result) => result,
        Err(e) => return (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    };

    match query.format.as_deref() {
        Some("full") => Json(json!({
            "audio": BASE64.encode(result.audio_bytes()),
            "wordSubtitle": result.word_subtitle,
            "sentenceSubtitle": result.sentence_subtitle,
        }))
        .into_response(),
        _ => (
            [(header::CONTENT_TYPE, output_format.content_type())],
            result.audio_bytes(),
        )
            .into_response(),
    }
}

pub async fn voices_handler(State(state): State<Arc<GatewayState>>) -> Response {
    match list_voices(&state.voices_endpoint).await {
        Ok(voices) => Json(voices).into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    }
}

pub async fn health_handler() -> Response {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}
