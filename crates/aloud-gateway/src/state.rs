//! Gateway shared state.

use std::sync::Arc;

use aloud_core::config::Config;
use aloud_tts::{protocol, Synthesizer};

/// Shared state accessible from all request handlers.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub synthesizer: Arc<Synthesizer>,
    pub voices_endpoint: String,
}

impl GatewayState {
    pub fn new(config: Arc<Config>) -> Self {
        let synthesizer = Arc::new(Synthesizer::from_config(config.tts.as_ref()));
        let voices_endpoint = config
            .tts
            .as_ref()
            .and_then(|t| t.voices_endpoint.clone())
            .unwrap_or_else(protocol::voices_endpoint);

        Self {
            config,
            synthesizer,
            voices_endpoint,
        }
    }
}
