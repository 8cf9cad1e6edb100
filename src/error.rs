//! Error types for the realtime client.

use crate::diagnostics::ConnectDiagnostics;
use std::time::Duration;
use thiserror::Error;

/// Result type for realtime operations.
pub type Result<T> = std::result::Result<T, RealtimeError>;

#[derive(Error, Debug)]
pub enum RealtimeError {
    /// Missing or invalid configuration, raised before any socket attempt.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No open event arrived within the handshake window; the half-open
    /// socket has been torn down.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// The socket failed before reaching the open state. When the failure
    /// carried an HTTP rejection or I/O metadata, `diagnostics` holds a
    /// redacted record of it.
    #[error("handshake failed: {message}")]
    HandshakeFailed {
        message: String,
        diagnostics: Option<ConnectDiagnostics>,
    },

    /// A send was attempted while no socket is open. This layer never
    /// buffers or queues on the caller's behalf.
    #[error("socket is not connected")]
    NotConnected,

    /// Transport failure after the connection was open.
    #[error("transport error: {0}")]
    Transport(String),

    /// Outbound event could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RealtimeError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }
}
