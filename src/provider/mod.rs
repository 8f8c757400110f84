//! Model provider abstraction for pantrybot.
//!
//! The orchestration loop talks to the model through the [`ModelClient`]
//! trait: one non-streaming completion per round, carrying the system
//! prompt, the transcript so far, and the current tool declarations. The
//! production implementation is [`AnthropicClient`]; tests substitute
//! scripted clients.

mod anthropic;

pub use anthropic::AnthropicClient;

use anyhow::Result;

use crate::message::{Message, Segment};
use crate::tools::ToolDeclaration;

/// One model turn: the content segments exactly as emitted, plus the
/// reported stop reason (kept for logging; the loop decides from the
/// segments themselves).
#[derive(Debug, Clone)]
pub struct ModelTurn {
    pub segments: Vec<Segment>,
    pub stop_reason: Option<String>,
}

/// A completion backend the loop can drive.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Requests one turn from the model. The tool declarations are passed
    /// fresh on every call.
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ModelTurn>;
}
