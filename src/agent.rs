//! The tool-calling orchestration loop.
//!
//! [`run_loop`] drives one chat request to completion: ask the model for a
//! turn, and if the turn requests tools, execute every invocation in
//! emission order, fold the outcomes back into the transcript, and ask
//! again. A turn with no tool invocations ends the loop; a fixed round
//! ceiling bounds it. Each invocation reaches the executor exactly once,
//! and outcomes are appended in invocation order, so a transcript replays
//! deterministically regardless of tool timing.

use anyhow::Result;
use tracing::{info, warn};

use crate::constants::{EXHAUSTED_REPLY, MAX_TOOL_ROUNDS};
use crate::message::{Message, Segment};
use crate::provider::ModelClient;
use crate::tools::ToolRegistry;

/// What a completed loop run hands back to the caller.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The final assistant text.
    pub response: String,
    /// Whether any tool fired during the whole run.
    pub tool_used: bool,
}

/// Runs the model/tool exchange over `messages` until the model answers in
/// plain text or the round ceiling is hit.
///
/// The transcript is extended in place: the caller appends the user
/// utterance beforehand and decides what to do with the grown transcript
/// afterwards (persist it, or drop it for stateless runs). The final
/// assistant message is always appended before returning.
///
/// # Errors
///
/// Fails only when the model API itself fails; in that case `messages` may
/// have grown by completed tool rounds, and the caller should discard it
/// rather than persist a half-finished exchange.
pub async fn run_loop(
    model: &dyn ModelClient,
    system_prompt: &str,
    messages: &mut Vec<Message>,
    tools: &ToolRegistry,
) -> Result<ChatOutcome> {
    let mut tool_used = false;

    for round in 1..=MAX_TOOL_ROUNDS {
        // Declarations are rebuilt each round; they are cheap and the
        // model must always see the current catalog.
        let turn = model
            .complete(system_prompt, messages, &tools.declarations())
            .await?;
        info!(round, stop_reason = ?turn.stop_reason, "model responded");

        let assistant = Message::assistant_turn(turn.segments);
        if !assistant.requests_tools() {
            let response = assistant.text();
            messages.push(Message::assistant(response.clone()));
            info!(round, chars = response.len(), "final response");
            return Ok(ChatOutcome {
                response,
                tool_used,
            });
        }

        tool_used = true;

        let requested: Vec<(String, String, serde_json::Value)> = assistant
            .content
            .iter()
            .filter_map(|seg| match seg {
                Segment::ToolUse { id, name, input } => {
                    Some((id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect();

        // The full assistant turn goes into the transcript before anything
        // executes, so it always reflects what the model actually asked
        // for, including prose interleaved with the invocations.
        messages.push(assistant);

        let mut outcomes = Vec::with_capacity(requested.len());
        for (id, name, input) in requested {
            info!(tool = %name, round, "executing tool");
            let result = tools.run(&name, &input).await;
            outcomes.push(Segment::ToolResult {
                tool_use_id: id,
                content: result.content.to_string(),
                is_error: result.is_error,
            });
        }
        messages.push(Message::tool_outcomes(outcomes));
    }

    warn!(
        "hit max iterations ({}) in tool calling loop",
        MAX_TOOL_ROUNDS
    );
    messages.push(Message::assistant(EXHAUSTED_REPLY));
    Ok(ChatOutcome {
        response: EXHAUSTED_REPLY.to_string(),
        tool_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ModelTurn;
    use crate::tools::{ParamKind, ParamSpec, Tool, ToolSpec};
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A model that plays back a fixed sequence of turns.
    struct ScriptedModel {
        turns: Mutex<VecDeque<Vec<Segment>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(turns: Vec<Vec<Segment>>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
                calls: AtomicUsize::new(0),
            }
        }

        /// A model that requests the same tool forever.
        fn always_tooling() -> Self {
            Self {
                turns: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ModelClient for ScriptedModel {
        async fn complete(
            &self,
            _system_prompt: &str,
            _messages: &[Message],
            _tools: &[crate::tools::ToolDeclaration],
        ) -> Result<ModelTurn> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let segments = self.turns.lock().unwrap().pop_front().unwrap_or_else(|| {
                vec![Segment::ToolUse {
                    id: format!("toolu_{}", n),
                    name: "probe".into(),
                    input: json!({"tag": n}),
                }]
            });
            Ok(ModelTurn {
                segments,
                stop_reason: None,
            })
        }
    }

    /// A tool that records every execution it sees.
    struct ProbeTool {
        spec: ToolSpec,
        log: Arc<Mutex<Vec<Value>>>,
    }

    impl ProbeTool {
        fn new(log: Arc<Mutex<Vec<Value>>>) -> Self {
            Self {
                spec: ToolSpec {
                    name: "probe",
                    description: "records calls",
                    params: vec![ParamSpec::optional("tag", ParamKind::Integer, "marker")],
                },
                log,
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for ProbeTool {
        fn spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, params: Value) -> Result<Value> {
            self.log.lock().unwrap().push(params.clone());
            Ok(json!({"success": true, "echo": params}))
        }
    }

    fn probe_registry() -> (ToolRegistry, Arc<Mutex<Vec<Value>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(ProbeTool::new(Arc::clone(&log))));
        (registry, log)
    }

    fn tool_use(id: &str, tag: u64) -> Segment {
        Segment::ToolUse {
            id: id.into(),
            name: "probe".into(),
            input: json!({"tag": tag}),
        }
    }

    fn text(t: &str) -> Segment {
        Segment::Text { text: t.into() }
    }

    #[tokio::test]
    async fn plain_text_turn_ends_immediately() {
        let model = ScriptedModel::new(vec![vec![text("Happy to help!")]]);
        let (registry, log) = probe_registry();
        let mut messages = vec![Message::user("thanks!")];

        let outcome = run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        assert_eq!(outcome.response, "Happy to help!");
        assert!(!outcome.tool_used);
        assert_eq!(model.calls(), 1);
        assert_eq!(messages.len(), 2);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tool_round_then_answer() {
        let model = ScriptedModel::new(vec![
            vec![tool_use("toolu_1", 7)],
            vec![text("Two items expire this week.")],
        ]);
        let (registry, log) = probe_registry();
        let mut messages = vec![Message::user("What's expiring soon?")];

        let outcome = run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        assert_eq!(outcome.response, "Two items expire this week.");
        assert!(outcome.tool_used);
        assert_eq!(model.calls(), 2);
        // user, assistant turn, outcomes, final answer
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, crate::message::Role::Assistant);
        assert_eq!(messages[2].role, crate::message::Role::User);
    }

    #[tokio::test]
    async fn transcript_records_turn_before_outcomes() {
        let model = ScriptedModel::new(vec![
            vec![text("Checking the pantry."), tool_use("toolu_1", 1)],
            vec![text("done")],
        ]);
        let (registry, _log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        // The assistant turn keeps its prose alongside the invocation.
        assert_eq!(messages[1].role, crate::message::Role::Assistant);
        assert_eq!(messages[1].text(), "Checking the pantry.");
        assert!(messages[1].requests_tools());

        // Outcomes ride a user-role message referencing the invocation id.
        assert_eq!(messages[2].role, crate::message::Role::User);
        match &messages[2].content[0] {
            Segment::ToolResult {
                tool_use_id,
                is_error,
                ..
            } => {
                assert_eq!(tool_use_id, "toolu_1");
                assert!(!is_error);
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn mixed_text_and_tools_is_not_final() {
        let model = ScriptedModel::new(vec![
            vec![text("Let me check."), tool_use("toolu_1", 1)],
            vec![text("Here's what I found.")],
        ]);
        let (registry, _log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        let outcome = run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        // Only the zero-invocation turn ends the loop.
        assert_eq!(outcome.response, "Here's what I found.");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn outcomes_preserve_invocation_order() {
        let model = ScriptedModel::new(vec![
            vec![
                tool_use("toolu_a", 1),
                tool_use("toolu_b", 2),
                tool_use("toolu_c", 3),
            ],
            vec![text("done")],
        ]);
        let (registry, log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        let outcome_ids: Vec<String> = messages[2]
            .content
            .iter()
            .map(|seg| match seg {
                Segment::ToolResult { tool_use_id, .. } => tool_use_id.clone(),
                other => panic!("expected tool result, got {:?}", other),
            })
            .collect();
        assert_eq!(outcome_ids, vec!["toolu_a", "toolu_b", "toolu_c"]);

        // Execution happened in emission order too.
        let tags: Vec<i64> = log
            .lock()
            .unwrap()
            .iter()
            .map(|params| params["tag"].as_i64().unwrap())
            .collect();
        assert_eq!(tags, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn each_invocation_executes_exactly_once() {
        let model = ScriptedModel::new(vec![
            vec![tool_use("toolu_1", 1), tool_use("toolu_2", 2)],
            vec![tool_use("toolu_3", 3)],
            vec![text("done")],
        ]);
        let (registry, log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn exhausts_at_exactly_ten_rounds() {
        let model = ScriptedModel::always_tooling();
        let (registry, log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        let outcome = run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        assert_eq!(outcome.response, EXHAUSTED_REPLY);
        assert!(outcome.tool_used);
        assert_eq!(model.calls(), MAX_TOOL_ROUNDS);
        assert_eq!(log.lock().unwrap().len(), MAX_TOOL_ROUNDS);
        // user + 10 × (assistant turn + outcomes) + apology
        assert_eq!(messages.len(), 1 + MAX_TOOL_ROUNDS * 2 + 1);
        assert_eq!(messages.last().unwrap().text(), EXHAUSTED_REPLY);
    }

    #[tokio::test]
    async fn unknown_tool_folds_into_error_outcome() {
        let model = ScriptedModel::new(vec![
            vec![Segment::ToolUse {
                id: "toolu_1".into(),
                name: "no_such_tool".into(),
                input: json!({}),
            }],
            vec![text("Sorry, I slipped.")],
        ]);
        let (registry, _log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        let outcome = run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        // The failure goes back to the model, which recovers.
        assert_eq!(outcome.response, "Sorry, I slipped.");
        match &messages[2].content[0] {
            Segment::ToolResult {
                content, is_error, ..
            } => {
                assert!(*is_error);
                assert!(content.contains("Unknown tool: no_such_tool"));
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn one_failing_invocation_does_not_poison_the_round() {
        let model = ScriptedModel::new(vec![
            vec![
                Segment::ToolUse {
                    id: "toolu_1".into(),
                    name: "no_such_tool".into(),
                    input: json!({}),
                },
                tool_use("toolu_2", 2),
            ],
            vec![text("done")],
        ]);
        let (registry, log) = probe_registry();
        let mut messages = vec![Message::user("hi")];

        run_loop(&model, "sys", &mut messages, &registry)
            .await
            .unwrap();

        // The good invocation still ran, and both outcomes were folded.
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(messages[2].content.len(), 2);
    }
}
