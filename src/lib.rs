pub mod classify;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod notify;
pub mod redact;
pub mod socket;
pub mod telemetry;

pub use agent_realtime_types as types;

pub use client::{AuthStyle, Config, TranscribeClient, VoiceClient};
pub use error::{RealtimeError, Result};
pub use notify::{Notification, NotificationRx};
pub use socket::{Phase, StateSnapshot};
