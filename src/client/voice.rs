//! Voice+text provider client.

use crate::classify::{ProviderProfile, AUDIO_FIELDS, TRANSCRIPT_FIELDS};
use crate::client::config::Config;
use crate::client::consts;
use crate::client::utils;
use crate::error::Result;
use crate::notify::NotificationRx;
use crate::socket::{Phase, Socket, StateSnapshot};
use crate::telemetry;
use agent_realtime_types::events::client::{
    ConversationItemCreateEvent, InputAudioBufferAppendEvent, InputAudioBufferClearEvent,
    InputAudioBufferCommitEvent, ResponseCreateEvent, SessionUpdateEvent,
};
use agent_realtime_types::{ClientEvent, Item, SessionConfig};
use base64::Engine;

/// Event vocabulary of the voice endpoint, covering both the preview and GA
/// event names.
pub static PROFILE: ProviderProfile = ProviderProfile {
    name: "voice",
    session_types: &["session.created", "session.updated"],
    audio_types: &["response.audio.delta", "response.output_audio.delta"],
    transcript_delta_types: &[
        "response.audio_transcript.delta",
        "response.output_audio_transcript.delta",
        "response.text.delta",
    ],
    transcript_final_types: &[
        "response.audio_transcript.done",
        "response.output_audio_transcript.done",
        "response.text.done",
    ],
    response_done_types: &["response.done"],
    audio_fields: AUDIO_FIELDS,
    transcript_fields: TRANSCRIPT_FIELDS,
};

pub struct VoiceClient {
    config: Config,
    session: SessionConfig,
    socket: Socket,
}

impl VoiceClient {
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

    /// Enqueues a user text item and immediately requests an audio+text
    /// response for it.
    pub async fn request_utterance(&mut self, text: &str) -> Result<()> {
        let item = ConversationItemCreateEvent::new(Item::user_text(text));
        self.socket
            .send(&ClientEvent::ConversationItemCreate(item))
            .await?;
        let response = ResponseCreateEvent::new()
            .with_modalities(vec!["audio".to_string(), "text".to_string()]);
        self.socket
            .send(&ClientEvent::ResponseCreate(response))
            .await
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
        let session = serde_json::to_value(self.session.voice_session())?;
        let event = ClientEvent::SessionUpdate(SessionUpdateEvent::new(session));
        self.socket.send(&event).await
    }
}
