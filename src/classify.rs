//! Data-driven classification of inbound frames.
//!
//! Each provider supplies a [`ProviderProfile`]: its event-type sets plus the
//! ordered field accessors used to dig the payload out of the frame.
//! Categories are evaluated in a fixed priority order and the first match
//! wins; different event sub-types place the same logical value in different
//! fields, so only the first non-empty field in an accessor list is
//! authoritative. Malformed JSON and unknown types are remote noise, not
//! errors, and are dropped without logging.

use serde_json::Value;

/// Ordered payload lookup; first accessor returning a non-empty string wins.
pub type FieldAccessor = fn(&Value) -> Option<&str>;

/// Per-provider classification tables.
pub struct ProviderProfile {
    pub name: &'static str,
    pub session_types: &'static [&'static str],
    pub audio_types: &'static [&'static str],
    pub transcript_delta_types: &'static [&'static str],
    pub transcript_final_types: &'static [&'static str],
    pub response_done_types: &'static [&'static str],
    pub audio_fields: &'static [FieldAccessor],
    pub transcript_fields: &'static [FieldAccessor],
}

/// Outcome of classifying one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Session {
        session_id: Option<String>,
    },
    Error {
        message: String,
        code: Option<String>,
        param: Option<String>,
    },
    AudioDelta {
        audio: String,
    },
    Transcript {
        text: String,
        is_final: bool,
    },
    ResponseDone {
        raw: Value,
    },
    Ignored,
}

pub fn classify(profile: &ProviderProfile, raw: &str) -> Classified {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return Classified::Ignored;
    };
    if !value.is_object() {
        return Classified::Ignored;
    }
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Classified::Ignored;
    };

    if profile.session_types.contains(&kind) {
        let session_id = value
            .pointer("/session/id")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Classified::Session { session_id };
    }

    if kind == "error" {
        let message = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| value.get("message").and_then(Value::as_str))
            .unwrap_or("unknown error")
            .to_string();
        let code = value
            .pointer("/error/code")
            .and_then(Value::as_str)
            .map(str::to_string);
        let param = value
            .pointer("/error/param")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Classified::Error {
            message,
            code,
            param,
        };
    }

    if profile.audio_types.contains(&kind) {
        if let Some(audio) = first_non_empty(profile.audio_fields, &value) {
            return Classified::AudioDelta {
                audio: audio.to_string(),
            };
        }
        return Classified::Ignored;
    }

    let is_final = profile.transcript_final_types.contains(&kind);
    if is_final || profile.transcript_delta_types.contains(&kind) {
        // The first non-empty field is authoritative even when it trims to
        // nothing; a whitespace-only transcript is dropped, not searched past.
        if let Some(text) = first_non_empty(profile.transcript_fields, &value) {
            let text = text.trim();
            if !text.is_empty() {
                return Classified::Transcript {
                    text: text.to_string(),
                    is_final,
                };
            }
        }
        return Classified::Ignored;
    }

    if profile.response_done_types.contains(&kind) {
        return Classified::ResponseDone { raw: value };
    }

    Classified::Ignored
}

fn first_non_empty<'a>(accessors: &[FieldAccessor], value: &'a Value) -> Option<&'a str> {
    accessors
        .iter()
        .find_map(|accessor| accessor(value).filter(|s| !s.is_empty()))
}

// Shared field accessors. Search order per list is part of the wire contract.

pub(crate) fn delta_field(v: &Value) -> Option<&str> {
    v.get("delta").and_then(Value::as_str)
}

pub(crate) fn audio_field(v: &Value) -> Option<&str> {
    v.get("audio").and_then(Value::as_str)
}

pub(crate) fn data_field(v: &Value) -> Option<&str> {
    v.get("data").and_then(Value::as_str)
}

pub(crate) fn response_audio_field(v: &Value) -> Option<&str> {
    v.pointer("/response/audio").and_then(Value::as_str)
}

pub(crate) fn transcript_field(v: &Value) -> Option<&str> {
    v.get("transcript").and_then(Value::as_str)
}

pub(crate) fn text_field(v: &Value) -> Option<&str> {
    v.get("text").and_then(Value::as_str)
}

pub(crate) fn item_transcript_field(v: &Value) -> Option<&str> {
    v.pointer("/item/content/0/transcript").and_then(Value::as_str)
}

/// Audio payload search order: direct delta, then the nested variants.
pub(crate) const AUDIO_FIELDS: &[FieldAccessor] =
    &[delta_field, audio_field, data_field, response_audio_field];

/// Transcript search order: transcript, text, delta, then the content item.
pub(crate) const TRANSCRIPT_FIELDS: &[FieldAccessor] = &[
    transcript_field,
    text_field,
    delta_field,
    item_transcript_field,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> ProviderProfile {
        ProviderProfile {
            name: "test",
            session_types: &["session.created", "session.updated"],
            audio_types: &["response.audio.delta"],
            transcript_delta_types: &["transcript.delta"],
            transcript_final_types: &["transcript.completed"],
            response_done_types: &["response.done"],
            audio_fields: AUDIO_FIELDS,
            transcript_fields: TRANSCRIPT_FIELDS,
        }
    }

    #[test]
    fn malformed_and_non_object_frames_are_dropped() {
        let p = profile();
        assert_eq!(classify(&p, "{not json"), Classified::Ignored);
        assert_eq!(classify(&p, "\"just a string\""), Classified::Ignored);
        assert_eq!(classify(&p, "[1,2,3]"), Classified::Ignored);
        assert_eq!(classify(&p, r#"{"no_type": true}"#), Classified::Ignored);
    }

    #[test]
    fn session_frames_capture_the_assigned_id() {
        let p = profile();
        let raw = json!({"type": "session.created", "session": {"id": "sess_1"}});
        assert_eq!(
            classify(&p, &raw.to_string()),
            Classified::Session {
                session_id: Some("sess_1".to_string())
            }
        );
    }

    #[test]
    fn error_frames_extract_nested_payload() {
        let p = profile();
        let raw = json!({
            "type": "error",
            "error": {"message": "bad session", "code": "invalid", "param": "voice"},
        });
        assert_eq!(
            classify(&p, &raw.to_string()),
            Classified::Error {
                message: "bad session".to_string(),
                code: Some("invalid".to_string()),
                param: Some("voice".to_string()),
            }
        );
    }

    #[test]
    fn error_frames_fall_back_to_top_level_message() {
        let p = profile();
        let raw = json!({"type": "error", "message": "boom"});
        assert_eq!(
            classify(&p, &raw.to_string()),
            Classified::Error {
                message: "boom".to_string(),
                code: None,
                param: None,
            }
        );
    }

    #[test]
    fn audio_fields_are_searched_in_order() {
        let p = profile();
        let direct = json!({"type": "response.audio.delta", "delta": "QUJD", "audio": "ignored"});
        assert_eq!(
            classify(&p, &direct.to_string()),
            Classified::AudioDelta {
                audio: "QUJD".to_string()
            }
        );

        let nested = json!({"type": "response.audio.delta", "response": {"audio": "REVG"}});
        assert_eq!(
            classify(&p, &nested.to_string()),
            Classified::AudioDelta {
                audio: "REVG".to_string()
            }
        );

        let empty = json!({"type": "response.audio.delta", "delta": ""});
        assert_eq!(classify(&p, &empty.to_string()), Classified::Ignored);
    }

    #[test]
    fn transcript_delta_then_final() {
        let p = profile();
        let delta = json!({"type": "transcript.delta", "delta": "hello"});
        assert_eq!(
            classify(&p, &delta.to_string()),
            Classified::Transcript {
                text: "hello".to_string(),
                is_final: false,
            }
        );

        let done = json!({"type": "transcript.completed", "transcript": "hello there"});
        assert_eq!(
            classify(&p, &done.to_string()),
            Classified::Transcript {
                text: "hello there".to_string(),
                is_final: true,
            }
        );
    }

    #[test]
    fn transcript_field_precedence_is_exact() {
        let p = profile();
        let raw = json!({
            "type": "transcript.completed",
            "transcript": "from transcript",
            "text": "from text",
            "delta": "from delta",
        });
        assert_eq!(
            classify(&p, &raw.to_string()),
            Classified::Transcript {
                text: "from transcript".to_string(),
                is_final: true,
            }
        );

        let nested = json!({
            "type": "transcript.completed",
            "item": {"content": [{"transcript": "nested"}]},
        });
        assert_eq!(
            classify(&p, &nested.to_string()),
            Classified::Transcript {
                text: "nested".to_string(),
                is_final: true,
            }
        );
    }

    #[test]
    fn whitespace_only_transcripts_are_dropped() {
        let p = profile();
        let raw = json!({"type": "transcript.delta", "delta": "   "});
        assert_eq!(classify(&p, &raw.to_string()), Classified::Ignored);
    }

    #[test]
    fn response_done_carries_the_raw_event() {
        let p = profile();
        let raw = json!({"type": "response.done", "response": {"id": "resp_1"}});
        let classified = classify(&p, &raw.to_string());
        match classified {
            Classified::ResponseDone { raw } => {
                assert_eq!(raw["response"]["id"], "resp_1");
            }
            other => panic!("expected ResponseDone, got {:?}", other),
        }
    }

    #[test]
    fn unknown_types_are_silently_ignored() {
        let p = profile();
        let raw = json!({"type": "rate_limits.updated", "rate_limits": []});
        assert_eq!(classify(&p, &raw.to_string()), Classified::Ignored);
    }

    #[test]
    fn session_types_win_over_transcript_fields() {
        // A lifecycle frame that happens to carry a text field must not be
        // treated as a transcript.
        let p = profile();
        let raw = json!({"type": "session.updated", "text": "noise", "session": {"id": "s2"}});
        assert_eq!(
            classify(&p, &raw.to_string()),
            Classified::Session {
                session_id: Some("s2".to_string())
            }
        );
    }
}
