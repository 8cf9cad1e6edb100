/// A single conversation item queued via `conversation.item.create`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    kind: String,
    role: String,
    content: Vec<ContentPart>,
}

impl Item {
    /// A user text message.
    pub fn user_text(text: &str) -> Self {
        Self {
            kind: "message".to_string(),
            role: "user".to_string(),
            content: vec![ContentPart::input_text(text)],
        }
    }

    /// Total characters of text across all parts.
    pub fn text_chars(&self) -> usize {
        self.content.iter().map(|part| part.text.chars().count()).sum()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

impl ContentPart {
    pub fn input_text(text: &str) -> Self {
        Self {
            kind: "input_text".to_string(),
            text: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_text_item_wire_shape() {
        let value = serde_json::to_value(Item::user_text("hello")).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "message",
                "role": "user",
                "content": [{"type": "input_text", "text": "hello"}],
            })
        );
    }
}
