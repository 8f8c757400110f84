//! Message types for pantrybot's conversation transcripts.
//!
//! Provides a structured [`Message`] type with [`Role`] and [`Segment`] enums
//! that represent conversation turns. Segments serialize in the Anthropic
//! content-block wire shape, so a transcript can be sent to the Messages API
//! without conversion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role of a message sender in the conversation.
///
/// Only `user` and `assistant` exist in a transcript; tool outcomes are
/// carried as user-role messages holding [`Segment::ToolResult`] blocks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain prose.
    Text { text: String },
    /// A tool invocation requested by the model.
    ToolUse {
        /// Unique identifier for this invocation (used to match results).
        id: String,
        /// Name of the tool to invoke.
        name: String,
        /// JSON arguments to pass to the tool.
        input: Value,
    },
    /// The outcome of one tool invocation, fed back to the model.
    ToolResult {
        /// The `id` of the [`Segment::ToolUse`] this answers.
        tool_use_id: String,
        /// JSON-serialized tool payload.
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Segment>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![Segment::Text { text: text.into() }],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![Segment::Text { text: text.into() }],
        }
    }

    /// An assistant turn with its segments exactly as the model emitted them.
    pub fn assistant_turn(content: Vec<Segment>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A user-role message carrying the outcomes of one tool round.
    pub fn tool_outcomes(content: Vec<Segment>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Concatenates all text segments, in order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for seg in &self.content {
            if let Segment::Text { text } = seg {
                out.push_str(text);
            }
        }
        out
    }

    /// Whether any segment is a tool invocation.
    pub fn requests_tools(&self) -> bool {
        self.content
            .iter()
            .any(|s| matches!(s, Segment::ToolUse { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn segments_use_anthropic_wire_tags() {
        let msg = Message::assistant_turn(vec![
            Segment::Text {
                text: "checking".into(),
            },
            Segment::ToolUse {
                id: "toolu_1".into(),
                name: "get_pantry_items".into(),
                input: json!({"category": "all"}),
            },
        ]);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][1]["type"], "tool_use");
        assert_eq!(value["content"][1]["name"], "get_pantry_items");
    }

    #[test]
    fn text_concatenates_in_order() {
        let msg = Message::assistant_turn(vec![
            Segment::Text { text: "a".into() },
            Segment::ToolUse {
                id: "toolu_1".into(),
                name: "x".into(),
                input: json!({}),
            },
            Segment::Text { text: "b".into() },
        ]);
        assert_eq!(msg.text(), "ab");
        assert!(msg.requests_tools());
    }
}
