//! Streaming read-aloud synthesis client.
//!
//! Drives the Edge read-aloud WebSocket protocol: negotiates a session,
//! sends an SSML payload, then demultiplexes the interleaved stream of
//! textual control frames, metadata frames, and binary audio frames into
//! a [`SynthesisResult`] with word- and sentence-level subtitle tracks.

pub mod connection;
pub mod frame;
pub mod protocol;
pub mod submaker;
pub mod synth;
pub mod voices;

pub use protocol::OutputFormat;
pub use submaker::SubMaker;
pub use synth::{SpeechRequest, SynthesisResult, Synthesizer};
pub use voices::{list_voices, VoiceInfo};
