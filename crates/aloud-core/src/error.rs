use thiserror::Error;

#[derive(Debug, Error)]
pub enum AloudError {
    #[error("Config error: {0}")]
    Config(String),

    /// Transport or upgrade-handshake failure. Never retried internally;
    /// the caller decides whether to call again.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A synthesis turn aborted before `turn.end` arrived.
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// A malformed inbound frame. Logged and dropped by the turn loop;
    /// surfaces only from direct parser calls.
    #[error("Protocol frame error: {0}")]
    Frame(String),

    #[error("Voice catalog error: {0}")]
    Voices(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AloudError>;
