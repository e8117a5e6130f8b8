//! Remote voice catalog client.
//!
//! Stateless request/response, separate from the streaming protocol. A
//! synthesis request's `voice` must be one of the returned short-names
//! for results to be meaningful.

use serde::{Deserialize, Serialize};
use tracing::debug;

use aloud_core::error::{AloudError, Result};

/// One voice descriptor from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceInfo {
    #[serde(rename = "Name")]
    pub name: String,

    /// Identifier accepted by the synthesis protocol (e.g. "en-US-AriaNeural").
    #[serde(rename = "ShortName")]
    pub short_name: String,

    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "Locale")]
    pub locale: String,

    #[serde(rename = "SuggestedCodec", default, skip_serializing_if = "Option::is_none")]
    pub suggested_codec: Option<String>,

    #[serde(rename = "FriendlyName", default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Fetch the voice catalog.
pub async fn list_voices(endpoint: &str) -> Result<Vec<VoiceInfo>> {
    let resp = reqwest::get(endpoint)
        .await
        .map_err(|e| AloudError::Voices(format!("request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AloudError::Voices(format!(
            "catalog returned {}",
            resp.status()
        )));
    }

    let voices: Vec<VoiceInfo> = resp
        .json()
        .await
        .map_err(|e| AloudError::Voices(format!("bad catalog body: {e}")))?;

    debug!(count = voices.len(), "Fetched voice catalog");
    Ok(voices)
}
