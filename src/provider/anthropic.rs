//! Anthropic Messages API client.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ModelClient, ModelTurn};
use crate::config::Config;
use crate::message::{Message, Segment};
use crate::tools::ToolDeclaration;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u64,
    system: &'a str,
    messages: &'a [Message],
    tools: &'a [ToolDeclaration],
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ApiBlock>,
    stop_reason: Option<String>,
}

/// Content blocks the API may return. Blocks this client does not model
/// (e.g. thinking) are skipped rather than failing the turn.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// A configured Anthropic API client.
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    /// Builds a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.anthropic_api_key()?.to_string();
        let http = Client::builder()
            .timeout(Duration::from_secs(crate::constants::MODEL_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: config
                .anthropic
                .base_url
                .clone()
                .unwrap_or_else(|| crate::constants::ANTHROPIC_BASE_URL.to_string()),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ModelTurn> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: crate::constants::MAX_TOKENS,
            system: system_prompt,
            messages,
            tools,
        };

        let resp = self
            .http
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", crate::constants::ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await
            .context("Anthropic API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            anyhow::bail!("Anthropic API error (HTTP {}): {}", status.as_u16(), detail);
        }

        let response: MessagesResponse = resp
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;
        debug!(stop_reason = ?response.stop_reason, "model turn received");

        let segments = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiBlock::Text { text } => Some(Segment::Text { text }),
                ApiBlock::ToolUse { id, name, input } => {
                    Some(Segment::ToolUse { id, name, input })
                }
                ApiBlock::Unknown => None,
            })
            .collect();

        Ok(ModelTurn {
            segments,
            stop_reason: response.stop_reason,
        })
    }
}
