//! HTTP handlers for the pantrybot endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use super::dto::{
    ChatReply, ChatRequest, CompletionReply, CompletionRequest, HealthReply, IncomingMessage,
    ToolExecuteRequest, ToolListEntry, ToolListReply, UnknownToolReply,
};
use super::AppState;
use crate::agent::run_loop;
use crate::constants::{
    CHAT_SYSTEM_PROMPT, DEFAULT_CONVERSATION_ID, OPENAI_MODEL_ID, OPENAI_SYSTEM_PROMPT,
};
use crate::message::Message;

/// `GET /` — health check and deployment info.
pub async fn health(State(state): State<AppState>) -> Json<HealthReply> {
    Json(HealthReply {
        service: "PantryBot (Claude API)".to_string(),
        status: "running".to_string(),
        grocy_url: state.grocy_url.clone(),
        ai_backend: "Claude API".to_string(),
        ai_model: state.model_name.clone(),
        recipe_dir: state.recipe_dir.clone(),
    })
}

/// `POST /chat` — stateful chat through the orchestration loop.
///
/// The conversation's lock is held for the whole run, and the grown
/// transcript is committed only after the loop completes, so a failed run
/// leaves no half-appended messages behind.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatReply> {
    let conversation_id = req
        .conversation_id
        .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string());
    info!(conversation = %conversation_id, "chat message received");

    let handle = state.store.get_or_create(&conversation_id).await;
    let mut conversation = handle.lock().await;

    let mut transcript = conversation.snapshot();
    transcript.push(Message::user(&req.message));

    match run_loop(
        state.model.as_ref(),
        CHAT_SYSTEM_PROMPT,
        &mut transcript,
        &state.tools,
    )
    .await
    {
        Ok(outcome) => {
            conversation.commit(transcript);
            Json(ChatReply::Success {
                response: outcome.response,
                tool_used: outcome.tool_used,
                conversation_id,
            })
        }
        Err(err) => {
            error!(error = %err, conversation = %conversation_id, "chat failed");
            Json(ChatReply::Failure {
                error: format!("Chat failed: {}", err),
                conversation_id,
            })
        }
    }
}

/// `POST /tools/execute` — direct tool invocation.
///
/// Unknown tool names are the only 400; validation and adapter failures of
/// a known tool come back as that tool's error payload, exactly as the
/// model would see them.
pub async fn execute_tool(
    State(state): State<AppState>,
    Json(req): Json<ToolExecuteRequest>,
) -> Response {
    info!(tool = %req.tool, "executing tool over HTTP");
    if !state.tools.contains(&req.tool) {
        return (
            StatusCode::BAD_REQUEST,
            Json(UnknownToolReply {
                detail: format!("Unknown tool: {}", req.tool),
            }),
        )
            .into_response();
    }
    let parameters = req.parameters.unwrap_or_else(|| json!({}));
    let result = state.tools.run(&req.tool, &parameters).await;
    Json(result.content).into_response()
}

/// `GET /tools/list` — human-oriented catalog summary.
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolListReply> {
    let tools = state
        .tools
        .specs()
        .into_iter()
        .map(|spec| ToolListEntry {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            parameters: spec
                .params
                .iter()
                .map(|p| {
                    if p.required {
                        p.name.to_string()
                    } else {
                        format!("{} (optional)", p.name)
                    }
                })
                .collect(),
        })
        .collect();
    Json(ToolListReply { tools })
}

/// `GET /v1/models` — OpenAI-compatible model listing.
pub async fn openai_models() -> Json<serde_json::Value> {
    Json(json!({
        "object": "list",
        "data": [
            {
                "id": OPENAI_MODEL_ID,
                "object": "model",
                "created": 1677649963,
                "owned_by": "pantrybot",
                "permission": [],
                "root": OPENAI_MODEL_ID,
                "parent": null,
            }
        ]
    }))
}

/// Converts OpenAI-format messages to a transcript, keeping only user and
/// assistant entries (system messages are dropped, not merged).
pub fn to_transcript(incoming: &[IncomingMessage]) -> Vec<Message> {
    incoming
        .iter()
        .filter_map(|msg| match msg.role.as_str() {
            "user" => Some(Message::user(&msg.content)),
            "assistant" => Some(Message::assistant(&msg.content)),
            _ => None,
        })
        .collect()
}

/// `POST /v1/chat/completions` — OpenAI-compatible stateless chat.
pub async fn openai_completions(
    State(state): State<AppState>,
    Json(req): Json<CompletionRequest>,
) -> Response {
    info!("OpenAI-compatible chat request received");

    if req.messages.is_empty() {
        return Json(json!({"error": "No messages provided"})).into_response();
    }
    let mut transcript = to_transcript(&req.messages);
    if transcript.is_empty() {
        return Json(json!({"error": "No valid messages found"})).into_response();
    }

    match run_loop(
        state.model.as_ref(),
        OPENAI_SYSTEM_PROMPT,
        &mut transcript,
        &state.tools,
    )
    .await
    {
        Ok(outcome) => Json(CompletionReply::wrap(outcome.response)).into_response(),
        Err(err) => {
            error!(error = %err, "chat failed");
            Json(json!({"error": format!("Chat failed: {}", err)})).into_response()
        }
    }
}
