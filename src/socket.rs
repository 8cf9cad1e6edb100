//! Socket lifecycle manager and outbound sender.
//!
//! Owns at most one WebSocket per instance. The write half stays with the
//! manager so `send` can fail synchronously while closed; a spawned reader
//! task owns the read half, classifies inbound frames through the provider
//! profile and broadcasts notifications. There is no reconnect logic here;
//! retry policy belongs to the caller.

use crate::classify::{self, Classified, ProviderProfile};
use crate::diagnostics;
use crate::error::{RealtimeError, Result};
use crate::notify::{Notification, NotificationRx, NotificationTx};
use crate::telemetry::{OutboundRecord, Telemetry, HIGH_VOLUME_KIND};
use agent_realtime_types::ClientEvent;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Bound on the protocol-upgrade handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a graceful close waits for the acknowledgment before the reader
/// task is terminated.
pub const CLOSE_GRACE: Duration = Duration::from_millis(1500);

/// Reason string sent with the normal-closure frame.
pub const CLOSE_REASON: &str = "client shutdown";

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No connect attempt yet.
    Init,
    /// Handshake in flight.
    Connecting,
    /// Handshake succeeded.
    Open,
    /// Initial session configuration sent.
    Active,
    /// Explicit close, remote close, or forced timeout.
    Closed,
}

#[derive(Debug)]
struct ConnState {
    phase: Phase,
    connected_at: Option<SystemTime>,
    last_event_at: Option<SystemTime>,
    last_error: Option<String>,
    session_id: Option<String>,
    last_close_code: Option<u16>,
    last_close_reason: Option<String>,
}

impl ConnState {
    fn new() -> Self {
        Self {
            phase: Phase::Init,
            connected_at: None,
            last_event_at: None,
            last_error: None,
            session_id: None,
            last_close_code: None,
            last_close_reason: None,
        }
    }
}

/// Point-in-time view of connection state and outbound telemetry. Safe to
/// take before any connect attempt.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub phase: Phase,
    pub connected_at: Option<SystemTime>,
    pub last_event_at: Option<SystemTime>,
    pub last_error: Option<String>,
    pub session_id: Option<String>,
    pub last_close_code: Option<u16>,
    pub last_close_reason: Option<String>,
    pub last_outbound_kind: Option<String>,
    pub last_outbound_at: Option<SystemTime>,
    pub recent_outbound: Vec<OutboundRecord>,
}

pub struct Socket {
    profile: &'static ProviderProfile,
    summarize: fn(&ClientEvent) -> Value,
    writer: Option<WsWriter>,
    reader: Option<tokio::task::JoinHandle<()>>,
    state: Arc<Mutex<ConnState>>,
    telemetry: Arc<Mutex<Telemetry>>,
    notify_tx: NotificationTx,
    log_suppression: HashSet<String>,
}

impl Socket {
    pub fn new(
        profile: &'static ProviderProfile,
        summarize: fn(&ClientEvent) -> Value,
        capacity: usize,
    ) -> Self {
        let (notify_tx, _) = tokio::sync::broadcast::channel(capacity);
        let mut log_suppression = HashSet::new();
        log_suppression.insert(HIGH_VOLUME_KIND.to_string());
        Self {
            profile,
            summarize,
            writer: None,
            reader: None,
            state: Arc::new(Mutex::new(ConnState::new())),
            telemetry: Arc::new(Mutex::new(Telemetry::new())),
            notify_tx,
            log_suppression,
        }
    }

    /// Event types whose outbound summaries are not logged. Telemetry still
    /// records them.
    pub fn set_log_suppression(&mut self, kinds: &[&str]) {
        self.log_suppression = kinds.iter().map(|k| k.to_string()).collect();
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn subscribe(&self) -> NotificationRx {
        self.notify_tx.subscribe()
    }

    /// Opens the socket under [`CONNECT_TIMEOUT`]. Idempotent: an already
    /// open socket is left alone and no second set of handlers is spawned.
    pub async fn connect(&mut self, request: Request) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        let target = request.uri().to_string();
        if let Ok(mut st) = self.state.lock() {
            st.phase = Phase::Connecting;
        }
        match tokio::time::timeout(CONNECT_TIMEOUT, connect_async(request)).await {
            Err(_) => {
                // Dropping the pending handshake future tears down the
                // half-open socket.
                if let Ok(mut st) = self.state.lock() {
                    st.phase = Phase::Closed;
                    st.last_error =
                        Some(format!("handshake timed out after {:?}", CONNECT_TIMEOUT));
                }
                Err(RealtimeError::HandshakeTimeout(CONNECT_TIMEOUT))
            }
            Ok(Err(e)) => {
                let diagnostics = diagnostics::from_handshake_error(&e, &target);
                if let Ok(mut st) = self.state.lock() {
                    st.phase = Phase::Closed;
                    st.last_error = Some(e.to_string());
                }
                tracing::warn!(?diagnostics, "handshake failed: {}", e);
                Err(RealtimeError::HandshakeFailed {
                    message: e.to_string(),
                    diagnostics,
                })
            }
            Ok(Ok((stream, _response))) => {
                let (write, read) = stream.split();
                self.writer = Some(write);
                if let Ok(mut st) = self.state.lock() {
                    let now = SystemTime::now();
                    st.phase = Phase::Open;
                    st.connected_at = Some(now);
                    st.last_event_at = Some(now);
                    st.last_error = None;
                }
                tracing::info!(provider = self.profile.name, "realtime socket open");
                self.reader = Some(tokio::spawn(read_loop(
                    read,
                    self.profile,
                    self.state.clone(),
                    self.telemetry.clone(),
                    self.notify_tx.clone(),
                )));
                Ok(())
            }
        }
    }

    /// Serializes and transmits one event. Fails with
    /// [`RealtimeError::NotConnected`] before touching the wire when no
    /// socket is open or the connection has already closed; the redacted
    /// summary is recorded before transmission.
    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        // A remote close leaves the write half in place until `close` runs;
        // the phase check makes a send on that socket fail the same way.
        let closed = self
            .state
            .lock()
            .map(|st| st.phase == Phase::Closed)
            .unwrap_or(false);
        if closed {
            return Err(RealtimeError::NotConnected);
        }
        let writer = self.writer.as_mut().ok_or(RealtimeError::NotConnected)?;
        let kind = event.kind();
        let summary = (self.summarize)(event);
        if let Ok(mut telemetry) = self.telemetry.lock() {
            telemetry.record(kind, summary.clone());
        }
        if !self.log_suppression.contains(kind) {
            tracing::debug!(event = kind, summary = %summary, "outbound event");
        }
        let text = serde_json::to_string(event)?;
        writer.send(Message::Text(text)).await.map_err(|e| {
            if let Ok(mut st) = self.state.lock() {
                st.last_error = Some(e.to_string());
            }
            RealtimeError::transport(e.to_string())
        })
    }

    /// Marks the session configured. Called once the initial session
    /// configuration went out.
    pub fn mark_active(&mut self) {
        if let Ok(mut st) = self.state.lock() {
            if st.phase == Phase::Open {
                st.phase = Phase::Active;
            }
        }
    }

    /// Graceful-then-forced close. A no-op when no socket exists; the socket
    /// reference is cleared as the last step so repeated calls are safe.
    pub async fn close(&mut self) {
        if self.writer.is_none() {
            if let Some(handle) = self.reader.take() {
                handle.abort();
            }
            return;
        }
        if let Some(writer) = self.writer.as_mut() {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: CLOSE_REASON.into(),
            };
            if let Err(e) = writer.send(Message::Close(Some(frame))).await {
                tracing::debug!("close frame not delivered: {}", e);
            }
        }
        if let Some(mut handle) = self.reader.take() {
            if tokio::time::timeout(CLOSE_GRACE, &mut handle).await.is_err() {
                tracing::warn!(
                    "close not acknowledged within {:?}, terminating reader",
                    CLOSE_GRACE
                );
                handle.abort();
            }
        }
        if let Ok(mut st) = self.state.lock() {
            if st.phase != Phase::Closed {
                st.phase = Phase::Closed;
                st.last_close_code = Some(u16::from(CloseCode::Normal));
                st.last_close_reason = Some(CLOSE_REASON.to_string());
            }
        }
        self.writer = None;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let mut snapshot = StateSnapshot {
            phase: Phase::Init,
            connected_at: None,
            last_event_at: None,
            last_error: None,
            session_id: None,
            last_close_code: None,
            last_close_reason: None,
            last_outbound_kind: None,
            last_outbound_at: None,
            recent_outbound: Vec::new(),
        };
        if let Ok(st) = self.state.lock() {
            snapshot.phase = st.phase;
            snapshot.connected_at = st.connected_at;
            snapshot.last_event_at = st.last_event_at;
            snapshot.last_error = st.last_error.clone();
            snapshot.session_id = st.session_id.clone();
            snapshot.last_close_code = st.last_close_code;
            snapshot.last_close_reason = st.last_close_reason.clone();
        }
        if let Ok(telemetry) = self.telemetry.lock() {
            snapshot.last_outbound_kind = telemetry.last_kind().map(str::to_string);
            snapshot.last_outbound_at = telemetry.last_at();
            snapshot.recent_outbound = telemetry.recent();
        }
        snapshot
    }
}

async fn read_loop(
    mut read: WsReader,
    profile: &'static ProviderProfile,
    state: Arc<Mutex<ConnState>>,
    telemetry: Arc<Mutex<Telemetry>>,
    notify: NotificationTx,
) {
    while let Some(message) = read.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                // A transport error is a side channel: record it and keep
                // reading until the stream itself ends or closes.
                tracing::warn!("transport error: {}", e);
                if let Ok(mut st) = state.lock() {
                    st.last_error = Some(e.to_string());
                }
                let recent = telemetry.lock().map(|t| t.recent()).unwrap_or_default();
                let _ = notify.send(Notification::Error {
                    message: e.to_string(),
                    code: None,
                    param: None,
                    recent_outbound: recent,
                });
                continue;
            }
        };
        if let Ok(mut st) = state.lock() {
            // Advances on every inbound frame, understood or not.
            st.last_event_at = Some(SystemTime::now());
        }
        match message {
            Message::Text(text) => match classify::classify(profile, &text) {
                Classified::Session { session_id } => {
                    tracing::info!(
                        provider = profile.name,
                        session_id = session_id.as_deref().unwrap_or("unknown"),
                        "session lifecycle event"
                    );
                    if session_id.is_some() {
                        if let Ok(mut st) = state.lock() {
                            st.session_id = session_id.clone();
                        }
                    }
                    let _ = notify.send(Notification::SessionUpdated { session_id });
                }
                Classified::Error {
                    message,
                    code,
                    param,
                } => {
                    tracing::warn!(provider = profile.name, "server error: {}", message);
                    if let Ok(mut st) = state.lock() {
                        st.last_error = Some(message.clone());
                    }
                    let recent = telemetry.lock().map(|t| t.recent()).unwrap_or_default();
                    let _ = notify.send(Notification::Error {
                        message,
                        code,
                        param,
                        recent_outbound: recent,
                    });
                }
                Classified::AudioDelta { audio } => {
                    let _ = notify.send(Notification::AudioDelta { audio });
                }
                Classified::Transcript { text, is_final } => {
                    let _ = notify.send(Notification::Transcript { text, is_final });
                }
                Classified::ResponseDone { raw } => {
                    let _ = notify.send(Notification::ResponseDone { raw });
                }
                Classified::Ignored => {}
            },
            Message::Binary(bin) => {
                tracing::warn!("unexpected binary message: {} bytes", bin.len());
            }
            Message::Close(frame) => {
                let (code, reason) = match frame {
                    Some(frame) => (
                        Some(u16::from(frame.code)),
                        Some(frame.reason.to_string()),
                    ),
                    None => (None, None),
                };
                tracing::info!(?code, ?reason, "connection closed by remote");
                if let Ok(mut st) = state.lock() {
                    st.phase = Phase::Closed;
                    st.last_close_code = code;
                    st.last_close_reason = reason.clone();
                }
                let _ = notify.send(Notification::Closed { code, reason });
                break;
            }
            _ => {}
        }
    }
    // Stream ended without a close frame: still counts as closed.
    let mut already_closed = false;
    if let Ok(mut st) = state.lock() {
        if st.phase == Phase::Closed {
            already_closed = true;
        } else {
            st.phase = Phase::Closed;
        }
    }
    if !already_closed {
        let _ = notify.send(Notification::Closed {
            code: None,
            reason: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{AUDIO_FIELDS, TRANSCRIPT_FIELDS};
    use crate::telemetry::summarize;
    use agent_realtime_types::events::client::InputAudioBufferCommitEvent;

    static TEST_PROFILE: ProviderProfile = ProviderProfile {
        name: "test",
        session_types: &["session.created"],
        audio_types: &[],
        transcript_delta_types: &[],
        transcript_final_types: &[],
        response_done_types: &["response.done"],
        audio_fields: AUDIO_FIELDS,
        transcript_fields: TRANSCRIPT_FIELDS,
    };

    #[tokio::test]
    async fn send_without_socket_raises_not_connected() {
        let mut socket = Socket::new(&TEST_PROFILE, summarize, 16);
        let event =
            ClientEvent::InputAudioBufferCommit(InputAudioBufferCommitEvent::new());
        let err = socket.send(&event).await.unwrap_err();
        assert!(matches!(err, RealtimeError::NotConnected));
        // Nothing was recorded for the rejected send.
        assert!(socket.snapshot().last_outbound_kind.is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent_without_a_socket() {
        let mut socket = Socket::new(&TEST_PROFILE, summarize, 16);
        socket.close().await;
        socket.close().await;
        assert!(!socket.is_open());
    }

    #[test]
    fn snapshot_is_safe_before_any_connect_attempt() {
        let socket = Socket::new(&TEST_PROFILE, summarize, 16);
        let snapshot = socket.snapshot();
        assert_eq!(snapshot.phase, Phase::Init);
        assert!(snapshot.connected_at.is_none());
        assert!(snapshot.recent_outbound.is_empty());
    }
}
