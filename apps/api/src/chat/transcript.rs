#![allow(dead_code)]

//! Append-only chat transcript: user turns, a trailing assistant turn
//! assembled from streamed chunks, and display-only error turns. The widget
//! runs client-side; this module is its reference semantics, including the
//! SSE delta parsing for the proxied gateway stream.

use serde::{Deserialize, Serialize};

use super::{ChatError, ChatMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    /// A failure surfaced as a visible turn; never sent to the gateway.
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Appends a streamed chunk to the trailing assistant turn, starting a
    /// new one when the last turn is not an assistant turn.
    pub fn append_chunk(&mut self, chunk: &str) {
        match self.turns.last_mut() {
            Some(turn) if turn.role == Role::Assistant => turn.content.push_str(chunk),
            _ => self.turns.push(Turn {
                role: Role::Assistant,
                content: chunk.to_string(),
            }),
        }
    }

    /// Surfaces a gateway failure as a visible error turn.
    pub fn push_error(&mut self, error: &ChatError) {
        self.turns.push(Turn {
            role: Role::Error,
            content: error.user_message().to_string(),
        });
    }

    /// The turns eligible to send upstream. Error turns are display-only.
    pub fn gateway_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .filter_map(|turn| match turn.role {
                Role::User => Some(ChatMessage::new("user", turn.content.clone())),
                Role::Assistant => Some(ChatMessage::new("assistant", turn.content.clone())),
                Role::Error => None,
            })
            .collect()
    }
}

/// Extracts the completion delta from one SSE line of the gateway stream.
/// Returns None for non-data lines, keep-alives, and the `[DONE]` marker.
pub fn delta_from_sse_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_accumulate_into_trailing_assistant_turn() {
        let mut t = Transcript::new();
        t.push_user("What does Yonela do?");
        t.append_chunk("She is a ");
        t.append_chunk("business analyst.");

        assert_eq!(t.turns().len(), 2);
        assert_eq!(t.turns()[1].role, Role::Assistant);
        assert_eq!(t.turns()[1].content, "She is a business analyst.");
    }

    #[test]
    fn test_new_user_turn_starts_fresh_assistant_turn() {
        let mut t = Transcript::new();
        t.push_user("Hi");
        t.append_chunk("Hello!");
        t.push_user("Tell me more");
        t.append_chunk("Sure.");

        assert_eq!(t.turns().len(), 4);
        assert_eq!(t.turns()[3].content, "Sure.");
    }

    #[test]
    fn test_rate_limit_error_turn_message() {
        let mut t = Transcript::new();
        t.push_user("Hi");
        t.push_error(&ChatError::RateLimited);

        let last = t.turns().last().unwrap();
        assert_eq!(last.role, Role::Error);
        assert!(last.content.contains("Rate limits exceeded"));
    }

    #[test]
    fn test_payment_error_turn_message() {
        let mut t = Transcript::new();
        t.push_error(&ChatError::PaymentRequired);
        assert!(t.turns()[0].content.contains("Payment required"));
    }

    #[test]
    fn test_generic_error_turn_message() {
        let mut t = Transcript::new();
        t.push_error(&ChatError::Gateway {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(t.turns()[0].content, "AI gateway error");
    }

    #[test]
    fn test_gateway_messages_exclude_error_turns() {
        let mut t = Transcript::new();
        t.push_user("Hi");
        t.push_error(&ChatError::RateLimited);
        t.push_user("Again");
        t.append_chunk("Hello!");

        let messages = t.gateway_messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.role != "error"));
    }

    #[test]
    fn test_delta_from_sse_line_extracts_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(delta_from_sse_line(line), Some("Hel".to_string()));
    }

    #[test]
    fn test_delta_from_sse_line_skips_done_and_noise() {
        assert_eq!(delta_from_sse_line("data: [DONE]"), None);
        assert_eq!(delta_from_sse_line("data:"), None);
        assert_eq!(delta_from_sse_line(": keep-alive"), None);
        assert_eq!(delta_from_sse_line(r#"data: {"choices":[{"delta":{}}]}"#), None);
    }
}
