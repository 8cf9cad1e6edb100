pub mod events;
pub mod session;
mod content;

pub use content::{ContentPart, Item};
pub use events::ClientEvent;
pub use session::{
    AudioCodec, AudioFormatSpec, SessionConfig, TranscriptionSession, TranscriptionSpec, Voice,
    VoiceSession,
};

/// Audio data encoded as base64
pub type Base64EncodedAudioBytes = String;
