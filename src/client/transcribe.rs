//! Transcription-only provider client.
//!
//! Holds one connection and one session configuration. Guidance fields
//! (language, prompt) can be updated after connect, which re-sends the
//! configuration.

use crate::classify::{ProviderProfile, AUDIO_FIELDS, TRANSCRIPT_FIELDS};
use crate::client::config::Config;
use crate::client::consts;
use crate::client::utils;
use crate::error::Result;
use crate::notify::NotificationRx;
use crate::socket::{Phase, Socket, StateSnapshot};
use crate::telemetry;
use agent_realtime_types::events::client::{
    InputAudioBufferAppendEvent, InputAudioBufferClearEvent, InputAudioBufferCommitEvent,
    SessionUpdateEvent,
};
use agent_realtime_types::{ClientEvent, SessionConfig};
use base64::Engine;

/// Event vocabulary of the transcription endpoint. Transcription sessions
/// return no model audio, so the audio-delta set is empty.
pub static PROFILE: ProviderProfile = ProviderProfile {
    name: "transcribe",
    session_types: &[
        "transcription_session.created",
        "transcription_session.updated",
        "session.created",
        "session.updated",
    ],
    audio_types: &[],
    transcript_delta_types: &["conversation.item.input_audio_transcription.delta"],
    transcript_final_types: &["conversation.item.input_audio_transcription.completed"],
    response_done_types: &["response.done"],
    audio_fields: AUDIO_FIELDS,
    transcript_fields: TRANSCRIPT_FIELDS,
};

pub struct TranscribeClient {
    config: Config,
    session: SessionConfig,
    socket: Socket,
}

impl TranscribeClient {
    pub fn new(config: Config, session: SessionConfig) -> Self {
        Self {
            config,
            session,
            socket: Socket::new(&PROFILE, telemetry::summarize, consts::DEFAULT_CAPACITY),
        }
    }

    /// Opens the connection and sends the initial session configuration.
    /// Idempotent: a configured socket is left alone; a socket whose setup
    /// was interrupted gets its configuration sent without a new handshake.
    pub async fn connect(&mut self) -> Result<StateSnapshot> {
        self.config.require_api_key()?;
        if self.socket.is_open() {
            // An earlier connect may have opened the socket but failed
            // before the configuration went out; finish the setup instead
            // of skipping it.
            if self.socket.snapshot().phase == Phase::Open {
                self.send_session_config().await?;
                self.socket.mark_active();
            }
            return Ok(self.socket.snapshot());
        }
        let request = utils::build_request(&self.config)?;
        self.socket.connect(request).await?;
        self.send_session_config().await?;
        self.socket.mark_active();
        Ok(self.socket.snapshot())
    }

    /// Appends one chunk of raw audio to the input buffer; a no-op on empty
    /// input.
    pub async fn append_input_audio(&mut self, audio: &[u8]) -> Result<()> {
        if audio.is_empty() {
            return Ok(());
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(audio);
        self.append_input_audio_b64(encoded).await
    }

    /// Appends one already base64-encoded chunk; a no-op on empty input.
    pub async fn append_input_audio_b64(&mut self, audio: String) -> Result<()> {
        if audio.is_empty() {
            return Ok(());
        }
        let event =
            ClientEvent::InputAudioBufferAppend(InputAudioBufferAppendEvent::new(audio));
        self.socket.send(&event).await
    }

    pub async fn commit_input_audio(&mut self) -> Result<()> {
        let event = ClientEvent::InputAudioBufferCommit(InputAudioBufferCommitEvent::new());
        self.socket.send(&event).await
    }

    pub async fn clear_input_audio(&mut self) -> Result<()> {
        let event = ClientEvent::InputAudioBufferClear(InputAudioBufferClearEvent::new());
        self.socket.send(&event).await
    }

    /// Updates the stored guidance fields and re-sends the session
    /// configuration.
    pub async fn update_guidance(
        &mut self,
        language: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<()> {
        if let Some(language) = language {
            self.session.set_language(language);
        }
        if let Some(prompt) = prompt {
            self.session.set_prompt(prompt);
        }
        self.send_session_config().await
    }

    /// Graceful close; safe to call repeatedly.
    pub async fn close(&mut self) {
        self.socket.close().await;
    }

    /// Connection state plus outbound telemetry; safe before any connect
    /// attempt.
    pub fn state(&self) -> StateSnapshot {
        self.socket.snapshot()
    }

    pub fn notifications(&self) -> NotificationRx {
        self.socket.subscribe()
    }

    pub fn set_log_suppression(&mut self, kinds: &[&str]) {
        self.socket.set_log_suppression(kinds);
    }

    async fn send_session_config(&mut self) -> Result<()> {
        let session = serde_json::to_value(self.session.transcription_session())?;
        let event = ClientEvent::SessionUpdate(SessionUpdateEvent::new(session));
        self.socket.send(&event).await
    }
}
