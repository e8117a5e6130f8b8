//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level aloud configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<TtsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

fn default_port() -> u16 {
    8787
}

/// Upstream speech-service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Synthesis WebSocket endpoint override. Defaults to the public
    /// read-aloud endpoint when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Voice catalog endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voices_endpoint: Option<String>,

    /// Default voice short-name (e.g. "en-US-AriaNeural").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_voice: Option<String>,

    /// Output format identifier (e.g. "audio-24khz-48kbitrate-mono-mp3").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,

    /// Prosody rate delta (e.g. "+0%", "-10%").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,

    /// Prosody volume delta (e.g. "+0%").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    /// Extra seconds added to every subtitle cue's end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "aloud_tts=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::AloudError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::AloudError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Default config file path: `~/.aloud/config.json`.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Gateway port.
    pub fn gateway_port(&self) -> u16 {
        self.gateway.as_ref().map(|g| g.port).unwrap_or(8787)
    }

    /// Gateway bind address.
    pub fn gateway_bind(&self) -> String {
        self.gateway
            .as_ref()
            .and_then(|g| g.bind.clone())
            .unwrap_or_else(|| "0.0.0.0".to_string())
    }

    /// Default voice short-name.
    pub fn default_voice(&self) -> String {
        self.tts
            .as_ref()
            .and_then(|t| t.default_voice.clone())
            .unwrap_or_else(|| "zh-CN-YunxiaNeural".to_string())
    }

    /// Subtitle cue overlap in seconds.
    pub fn overlap_seconds(&self) -> f64 {
        self.tts
            .as_ref()
            .and_then(|t| t.overlap_seconds)
            .unwrap_or(0.0)
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if let Some(gw) = &self.gateway {
            if gw.port == 0 {
                errors.push("Gateway port cannot be 0".to_string());
            }
        }

        if let Some(tts) = &self.tts {
            if let Some(overlap) = tts.overlap_seconds {
                if overlap < 0.0 {
                    errors.push("tts.overlap_seconds cannot be negative".to_string());
                }
            }
            for (name, value) in [("tts.rate", &tts.rate), ("tts.volume", &tts.volume)] {
                if let Some(v) = value {
                    if !v.starts_with('+') && !v.starts_with('-') {
                        warnings.push(format!(
                            "{name} '{v}' is not a signed delta (expected e.g. \"+0%\")"
                        ));
                    }
                }
            }
            if let Some(ep) = &tts.endpoint {
                if !ep.starts_with("ws://") && !ep.starts_with("wss://") {
                    errors.push(format!("tts.endpoint must be a ws:// or wss:// URL: {ep}"));
                }
            }
        }

        (warnings, errors)
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Base directory for aloud data: `~/.aloud/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aloud")
}
