use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// The voice the model uses to respond. Cannot be changed once the model has
/// responded with audio at least once.
#[derive(Debug, Clone, PartialEq)]
pub enum Voice {
    Alloy,
    Echo,
    Nova,
    Shimmer,
    Custom(String),
}

impl Voice {
    pub fn as_str(&self) -> &str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
            Voice::Custom(s) => s,
        }
    }
}

impl Serialize for Voice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl From<&str> for Voice {
    fn from(s: &str) -> Self {
        match s {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Custom(s.to_string()),
        }
    }
}

impl FromStr for Voice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Voice::from(s))
    }
}

impl<'de> Deserialize<'de> for Voice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Voice::from(s.as_str()))
    }
}

/// The codec of audio carried inside base64 frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCodec {
    #[serde(rename = "pcm16")]
    Pcm16,
    #[serde(rename = "g711_ulaw")]
    G711Ulaw,
    #[serde(rename = "g711_alaw")]
    G711Alaw,
}

impl AudioCodec {
    /// The MIME-style name used inside session.update format blocks.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AudioCodec::Pcm16 => "audio/pcm",
            AudioCodec::G711Ulaw => "audio/pcmu",
            AudioCodec::G711Alaw => "audio/pcma",
        }
    }
}

/// Audio format block as it appears on the wire:
/// `{"type": "audio/pcm", "rate": 24000}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFormatSpec {
    #[serde(rename = "type")]
    kind: String,
    rate: u32,
}

impl AudioFormatSpec {
    pub fn new(codec: AudioCodec, rate: u32) -> Self {
        Self {
            kind: codec.wire_name().to_string(),
            rate,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }
}

/// Input transcription block of a session.update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSpec {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

impl TranscriptionSpec {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            language: None,
            prompt: None,
        }
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(str::to_string);
        self
    }

    pub fn with_prompt(mut self, prompt: Option<&str>) -> Self {
        self.prompt = prompt.map(str::to_string);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Session configuration held by one provider client. Set at connect time;
/// the guidance fields (language, prompt) may be updated afterwards, which
/// triggers a fresh session.update on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    model: String,
    input_codec: AudioCodec,
    input_sample_rate: u32,
    output_sample_rate: u32,
    transcription_model: Option<String>,
    language: Option<String>,
    prompt: Option<String>,
    voice: Option<Voice>,
    instructions: Option<String>,
}

impl SessionConfig {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            input_codec: AudioCodec::Pcm16,
            input_sample_rate: DEFAULT_SAMPLE_RATE,
            output_sample_rate: DEFAULT_SAMPLE_RATE,
            transcription_model: None,
            language: None,
            prompt: None,
            voice: None,
            instructions: None,
        }
    }

    pub fn with_input_codec(mut self, codec: AudioCodec) -> Self {
        self.input_codec = codec;
        self
    }

    pub fn with_input_sample_rate(mut self, rate: u32) -> Self {
        self.input_sample_rate = rate;
        self
    }

    pub fn with_output_sample_rate(mut self, rate: u32) -> Self {
        self.output_sample_rate = rate;
        self
    }

    pub fn with_transcription_model(mut self, model: &str) -> Self {
        self.transcription_model = Some(model.to_string());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = Some(prompt.to_string());
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = Some(language.to_string());
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = Some(prompt.to_string());
    }

    /// Wire session body for the transcription-only provider. The
    /// transcription model falls back to the session model when unset.
    pub fn transcription_session(&self) -> TranscriptionSession {
        let model = self.transcription_model.as_deref().unwrap_or(&self.model);
        TranscriptionSession {
            input_audio_format: AudioFormatSpec::new(self.input_codec, self.input_sample_rate),
            input_audio_transcription: TranscriptionSpec::new(model)
                .with_language(self.language.as_deref())
                .with_prompt(self.prompt.as_deref()),
        }
    }

    /// Wire session body for the voice+text provider.
    pub fn voice_session(&self) -> VoiceSession {
        VoiceSession {
            modalities: vec!["text".to_string(), "audio".to_string()],
            voice: self.voice.clone(),
            instructions: self.instructions.clone(),
            input_audio_format: AudioFormatSpec::new(self.input_codec, self.input_sample_rate),
            output_audio_format: AudioFormatSpec::new(self.input_codec, self.output_sample_rate),
        }
    }
}

/// session.update body sent by the transcription-only client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSession {
    input_audio_format: AudioFormatSpec,
    input_audio_transcription: TranscriptionSpec,
}

impl TranscriptionSession {
    pub fn input_audio_format(&self) -> &AudioFormatSpec {
        &self.input_audio_format
    }

    pub fn input_audio_transcription(&self) -> &TranscriptionSpec {
        &self.input_audio_transcription
    }
}

/// session.update body sent by the voice+text client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSession {
    modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    input_audio_format: AudioFormatSpec,
    output_audio_format: AudioFormatSpec,
}

impl VoiceSession {
    pub fn modalities(&self) -> &[String] {
        &self.modalities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcription_session_wire_shape() {
        let config = SessionConfig::new("m1")
            .with_transcription_model("m1")
            .with_language("en")
            .with_prompt("Prefer English.");

        let value = serde_json::to_value(config.transcription_session()).unwrap();
        assert_eq!(
            value["input_audio_format"],
            json!({"type": "audio/pcm", "rate": 24000})
        );
        assert_eq!(
            value["input_audio_transcription"],
            json!({"model": "m1", "language": "en", "prompt": "Prefer English."})
        );
    }

    #[test]
    fn transcription_model_falls_back_to_session_model() {
        let config = SessionConfig::new("m1");
        let session = config.transcription_session();
        assert_eq!(session.input_audio_transcription().model(), "m1");
    }

    #[test]
    fn unset_guidance_fields_are_omitted_from_the_wire() {
        let config = SessionConfig::new("m1");
        let value = serde_json::to_value(config.transcription_session()).unwrap();
        let transcription = value["input_audio_transcription"].as_object().unwrap();
        assert!(!transcription.contains_key("language"));
        assert!(!transcription.contains_key("prompt"));
    }

    #[test]
    fn voice_session_wire_shape() {
        let config = SessionConfig::new("m2")
            .with_voice(Voice::Alloy)
            .with_instructions("Be brief.")
            .with_output_sample_rate(16000);

        let value = serde_json::to_value(config.voice_session()).unwrap();
        assert_eq!(value["modalities"], json!(["text", "audio"]));
        assert_eq!(value["voice"], json!("alloy"));
        assert_eq!(value["instructions"], json!("Be brief."));
        assert_eq!(value["output_audio_format"]["rate"], json!(16000));
    }

    #[test]
    fn custom_voice_round_trips() {
        let voice: Voice = serde_json::from_value(json!("breeze")).unwrap();
        assert_eq!(voice, Voice::Custom("breeze".to_string()));
        assert_eq!(serde_json::to_value(&voice).unwrap(), json!("breeze"));
    }
}
