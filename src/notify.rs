//! The closed set of notifications emitted to subscribers.
//!
//! Delivered through a `tokio::sync::broadcast` channel; each receiver sees
//! notifications in order. Inbound frames are transient: they are classified,
//! turned into one of these, and never retained.

use crate::telemetry::OutboundRecord;
use serde_json::Value;

pub type NotificationRx = tokio::sync::broadcast::Receiver<Notification>;
pub(crate) type NotificationTx = tokio::sync::broadcast::Sender<Notification>;

#[derive(Debug, Clone)]
pub enum Notification {
    /// Session-lifecycle marker; carries the provider-assigned session id
    /// when present.
    SessionUpdated { session_id: Option<String> },

    /// In-band protocol error or transport error. `recent_outbound` holds
    /// the last few redacted outbound events so the failure can be
    /// correlated with what was sent.
    Error {
        message: String,
        code: Option<String>,
        param: Option<String>,
        recent_outbound: Vec<OutboundRecord>,
    },

    /// One base64 chunk of model audio.
    AudioDelta { audio: String },

    /// Interim or final transcript text.
    Transcript { text: String, is_final: bool },

    /// The provider finished a response; the raw event is forwarded.
    ResponseDone { raw: Value },

    /// The socket closed, remotely or locally.
    Closed {
        code: Option<u16>,
        reason: Option<String>,
    },
}
