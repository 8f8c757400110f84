//! HTTP client for a running pantrybot server.
//!
//! Used by the `chat`, `ask`, and `tools` subcommands. Tracks the
//! conversation id returned by the server so a REPL session stays in one
//! conversation until the user starts a new one.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// `GET /` body, as served by [`crate::server`].
#[derive(Debug, Deserialize)]
pub struct ServerInfo {
    pub service: String,
    #[serde(default)]
    pub grocy_url: String,
    #[serde(default)]
    pub ai_model: String,
    #[serde(default)]
    pub recipe_dir: String,
}

/// `POST /chat` reply. `error` is set instead of `response` on failure.
#[derive(Debug, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub tool_used: bool,
    pub conversation_id: String,
}

/// One row of `GET /tools/list`.
#[derive(Debug, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ToolListBody {
    tools: Vec<ToolEntry>,
}

/// Client for the pantrybot HTTP API.
pub struct ApiClient {
    http: Client,
    base_url: String,
    conversation_id: Option<String>,
}

impl ApiClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: server_url.into().trim_end_matches('/').to_string(),
            conversation_id: None,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.base_url
    }

    /// Drops the tracked conversation so the next message starts fresh.
    pub fn reset_conversation(&mut self) {
        self.conversation_id = None;
    }

    /// Fetches server info, failing fast when the server is unreachable.
    pub async fn info(&self) -> Result<ServerInfo> {
        let resp = self
            .http
            .get(format!("{}/", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Failed to connect to pantrybot server")?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Sends a chat message, carrying the conversation id across turns.
    pub async fn chat(&mut self, message: &str) -> Result<ChatReply> {
        let mut payload = json!({"message": message});
        if let Some(id) = &self.conversation_id {
            payload["conversation_id"] = json!(id);
        }
        let reply: ChatReply = self
            .http
            .post(format!("{}/chat", self.base_url))
            .timeout(Duration::from_secs(
                crate::constants::CLIENT_CHAT_TIMEOUT_SECS,
            ))
            .json(&payload)
            .send()
            .await
            .context("Chat request failed")?
            .error_for_status()?
            .json()
            .await
            .context("Malformed chat reply")?;
        self.conversation_id = Some(reply.conversation_id.clone());
        Ok(reply)
    }

    /// Lists the server's tool catalog.
    pub async fn tools(&self) -> Result<Vec<ToolEntry>> {
        let body: ToolListBody = self
            .http
            .get(format!("{}/tools/list", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Failed to list tools")?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.tools)
    }
}
