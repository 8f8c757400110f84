//! Request/response types for the HTTP endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /chat` request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// `POST /chat` reply. Both arms answer 200; a failed model call reports
/// `error` and leaves the stored conversation untouched.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Success {
        response: String,
        tool_used: bool,
        conversation_id: String,
    },
    Failure {
        error: String,
        conversation_id: String,
    },
}

/// `POST /tools/execute` request body.
#[derive(Debug, Deserialize)]
pub struct ToolExecuteRequest {
    pub tool: String,
    #[serde(default)]
    pub parameters: Option<Value>,
}

/// 400 body for unrecognized tool names.
#[derive(Debug, Serialize)]
pub struct UnknownToolReply {
    pub detail: String,
}

/// One row of `GET /tools/list`.
#[derive(Debug, Serialize)]
pub struct ToolListEntry {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ToolListReply {
    pub tools: Vec<ToolListEntry>,
}

/// `GET /` body.
#[derive(Debug, Serialize)]
pub struct HealthReply {
    pub service: String,
    pub status: String,
    pub grocy_url: String,
    pub ai_backend: String,
    pub ai_model: String,
    pub recipe_dir: String,
}

/// One entry of an OpenAI-format `messages` list. Roles other than
/// `user`/`assistant` are dropped during conversion.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    pub content: String,
}

/// `POST /v1/chat/completions` request body.
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

/// `chatcmpl`-shaped reply envelope.
#[derive(Debug, Serialize)]
pub struct CompletionReply {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: CompletionUsage,
}

#[derive(Debug, Serialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

/// Token counts are deliberately not computed.
#[derive(Debug, Serialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl CompletionReply {
    /// Wraps a final answer in the standard envelope with a fresh opaque id
    /// and a fixed `stop` finish reason.
    pub fn wrap(response: impl Into<String>) -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("chatcmpl-{}", &hex[..24]),
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model: crate::constants::OPENAI_MODEL_ID.to_string(),
            choices: vec![CompletionChoice {
                index: 0,
                message: CompletionMessage {
                    role: "assistant".to_string(),
                    content: response.into(),
                },
                finish_reason: "stop".to_string(),
            }],
            usage: CompletionUsage {
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_id_is_chatcmpl_plus_24_hex() {
        let reply = CompletionReply::wrap("hello");
        let id = reply.id.strip_prefix("chatcmpl-").expect("prefix");
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(reply.choices[0].finish_reason, "stop");
        assert_eq!(reply.usage.total_tokens, 0);
    }
}
