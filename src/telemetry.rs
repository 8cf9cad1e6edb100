//! Bounded, redacted history of recent outbound events.
//!
//! Summaries are produced before storage, so nothing secret ever sits in the
//! buffer. The high-volume audio-append type is excluded from the history
//! entirely; only the single last-outbound pointer tracks it.

use agent_realtime_types::ClientEvent;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::time::SystemTime;

/// Maximum number of records kept; oldest evicted first.
pub const HISTORY_LIMIT: usize = 8;

/// The event type excluded from the history buffer.
pub const HIGH_VOLUME_KIND: &str = "input_audio_buffer.append";

/// One redacted outbound event.
#[derive(Debug, Clone)]
pub struct OutboundRecord {
    pub kind: String,
    pub at: SystemTime,
    pub summary: Value,
}

#[derive(Debug)]
pub struct Telemetry {
    history: VecDeque<OutboundRecord>,
    last_kind: Option<String>,
    last_at: Option<SystemTime>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            last_kind: None,
            last_at: None,
        }
    }

    /// Records one outbound event. The summary must already be redacted.
    pub fn record(&mut self, kind: &str, summary: Value) {
        let now = SystemTime::now();
        self.last_kind = Some(kind.to_string());
        self.last_at = Some(now);
        if kind == HIGH_VOLUME_KIND {
            return;
        }
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(OutboundRecord {
            kind: kind.to_string(),
            at: now,
            summary,
        });
    }

    /// The recent history, oldest first.
    pub fn recent(&self) -> Vec<OutboundRecord> {
        self.history.iter().cloned().collect()
    }

    pub fn last_kind(&self) -> Option<&str> {
        self.last_kind.as_deref()
    }

    pub fn last_at(&self) -> Option<SystemTime> {
        self.last_at
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Redacted summary of one outbound event, distinct per event type. Audio
/// payloads are reported by length only, never by content.
pub fn summarize(event: &ClientEvent) -> Value {
    match event {
        ClientEvent::SessionUpdate(e) => {
            let fields: Vec<&str> = e
                .session()
                .as_object()
                .map(|m| m.keys().map(String::as_str).collect())
                .unwrap_or_default();
            json!({ "session_fields": fields })
        }
        ClientEvent::InputAudioBufferAppend(e) => {
            json!({ "audio_b64_chars": e.audio().len() })
        }
        ClientEvent::InputAudioBufferCommit(_) | ClientEvent::InputAudioBufferClear(_) => {
            json!({})
        }
        ClientEvent::ConversationItemCreate(e) => {
            json!({ "text_chars": e.item().text_chars() })
        }
        ClientEvent::ResponseCreate(e) => {
            json!({ "modalities": e.response().map(|r| r.modalities()) })
        }
    }
}
