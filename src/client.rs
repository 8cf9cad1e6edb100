//! Provider clients built on the socket lifecycle manager.

mod config;
mod consts;
mod utils;

pub mod transcribe;
pub mod voice;

pub use config::{AuthStyle, Config, ConfigBuilder};
pub use transcribe::TranscribeClient;
pub use voice::VoiceClient;
