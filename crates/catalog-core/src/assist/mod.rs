//! Free-form instructions with file tools offered in auto mode
//!
//! The model decides whether to call a tool. Requested operations run
//! against a [`FileOps`] sandbox and their results are fed back until the
//! model replies with plain text or the step budget runs out.

mod file_ops;

pub use file_ops::{
    file_tools, FileOps, LIST_FILES_TOOL, MAX_READ_BYTES, READ_FILE_TOOL, WRITE_FILE_TOOL,
};

use crate::error::Result;
use crate::llm::{ChatMessage, LLMClient, ToolChoice};
use serde::Serialize;
use serde_json::Value;

/// Default number of model round-trips
pub const DEFAULT_MAX_STEPS: usize = 5;

/// One tool call the model asked for
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExecutedOperation {
    pub tool: String,
    pub arguments: Value,
    pub result: String,
    pub success: bool,
}

/// Result of an assist run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssistOutcome {
    /// Final text reply from the model
    pub reply: Option<String>,
    pub operations: Vec<ExecutedOperation>,
    pub steps: usize,
    /// False when the step budget ran out while the model still wanted tools
    pub finished: bool,
}

fn system_prompt() -> String {
    "You are a helpful assistant working inside a single project directory. \
     Use the file tools when the request needs to look at or change files; \
     paths are relative to that directory. Otherwise answer directly."
        .to_string()
}

/// Send `instruction` with the file tools offered in auto mode
pub async fn run_assist(
    client: &dyn LLMClient,
    file_ops: &FileOps,
    instruction: &str,
    max_steps: usize,
) -> Result<AssistOutcome> {
    let tools = file_tools();
    let mut messages = vec![
        ChatMessage::system(system_prompt()),
        ChatMessage::user(instruction),
    ];
    let mut outcome = AssistOutcome::default();

    for step in 1..=max_steps.max(1) {
        outcome.steps = step;
        let reply = client.chat(&messages, &tools, &ToolChoice::Auto).await?;

        if reply.tool_calls.is_empty() {
            outcome.reply = reply.text().map(str::to_string);
            outcome.finished = true;
            break;
        }

        tracing::info!(
            "Step {}: model requested {} tool call(s)",
            step,
            reply.tool_calls.len()
        );

        let calls = reply.tool_calls.clone();
        if reply.text().is_some() {
            outcome.reply = reply.text().map(str::to_string);
        }
        messages.push(reply);

        for call in calls {
            let arguments = call.parse_arguments();
            let result = arguments
                .as_ref()
                .map_err(|e| e.to_string())
                .and_then(|args| {
                    file_ops
                        .execute(call.name(), args)
                        .map_err(|e| e.to_string())
                });

            let (text, success) = match result {
                Ok(text) => (text, true),
                Err(e) => {
                    tracing::warn!("Tool '{}' failed: {}", call.name(), e);
                    (format!("Error: {}", e), false)
                }
            };

            outcome.operations.push(ExecutedOperation {
                tool: call.name().to_string(),
                arguments: arguments.unwrap_or(Value::Null),
                result: text.clone(),
                success,
            });
            messages.push(ChatMessage::tool_result(call.id, text));
        }
    }

    if !outcome.finished {
        tracing::warn!(
            "Stopped after {} step(s) with tool calls still pending",
            outcome.steps
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::llm::{ToolCall, ToolDefinition};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ReplayClient {
        replies: Mutex<VecDeque<ChatMessage>>,
        seen: Mutex<Vec<(Vec<ChatMessage>, ToolChoice)>>,
    }

    impl ReplayClient {
        fn new(replies: Vec<ChatMessage>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMClient for ReplayClient {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            tool_choice: &ToolChoice,
        ) -> Result<ChatMessage> {
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), tool_choice.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| CatalogError::ExternalError("no more replies".to_string()))
        }

        fn model_name(&self) -> &str {
            "replay"
        }
    }

    fn call(id: &str, name: &str, args: &str) -> ChatMessage {
        ChatMessage::assistant_tool_calls(vec![ToolCall::new(id, name, args)])
    }

    #[tokio::test]
    async fn test_plain_answer_runs_no_tools() {
        let dir = tempfile::tempdir().unwrap();
        let ops = FileOps::new(dir.path()).unwrap();
        let client = ReplayClient::new(vec![ChatMessage::assistant("Hello!")]);

        let outcome = run_assist(&client, &ops, "say hi", DEFAULT_MAX_STEPS)
            .await
            .unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.reply.as_deref(), Some("Hello!"));
        assert!(outcome.operations.is_empty());

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].1, ToolChoice::Auto);
        assert_eq!(seen[0].0[1].content.as_deref(), Some("say hi"));
    }

    #[tokio::test]
    async fn test_write_request_is_executed() {
        let dir = tempfile::tempdir().unwrap();
        let ops = FileOps::new(dir.path()).unwrap();
        let client = ReplayClient::new(vec![
            call(
                "call_a",
                WRITE_FILE_TOOL,
                r#"{"path":"notes/summary.txt","content":"3 headphones"}"#,
            ),
            ChatMessage::assistant("Saved the summary."),
        ]);

        let outcome = run_assist(&client, &ops, "save a summary", DEFAULT_MAX_STEPS)
            .await
            .unwrap();
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.operations.len(), 1);
        assert!(outcome.operations[0].success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes/summary.txt")).unwrap(),
            "3 headphones"
        );

        // the tool result is sent back against the call id
        let seen = client.seen.lock().unwrap();
        let last = seen[1].0.last().unwrap();
        assert_eq!(last.role, "tool");
        assert_eq!(last.tool_call_id.as_deref(), Some("call_a"));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_escape_are_reported_to_model() {
        let dir = tempfile::tempdir().unwrap();
        let ops = FileOps::new(dir.path()).unwrap();
        let client = ReplayClient::new(vec![
            call("c1", "delete_file", r#"{"path":"a"}"#),
            call("c2", READ_FILE_TOOL, r#"{"path":"../../etc/passwd"}"#),
            ChatMessage::assistant("I can't do that."),
        ]);

        let outcome = run_assist(&client, &ops, "clean up", DEFAULT_MAX_STEPS)
            .await
            .unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.operations.len(), 2);
        assert!(outcome.operations.iter().all(|op| !op.success));
        assert!(outcome.operations[0].result.starts_with("Error: "));
        assert!(outcome.operations[0].result.contains("Unknown tool: delete_file"));
    }

    #[tokio::test]
    async fn test_step_budget() {
        let dir = tempfile::tempdir().unwrap();
        let ops = FileOps::new(dir.path()).unwrap();
        let client = ReplayClient::new(vec![
            call("c1", LIST_FILES_TOOL, "{}"),
            call("c2", LIST_FILES_TOOL, "{}"),
            call("c3", LIST_FILES_TOOL, "{}"),
        ]);

        let outcome = run_assist(&client, &ops, "loop", 2).await.unwrap();
        assert!(!outcome.finished);
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.operations.len(), 2);
        assert_eq!(outcome.operations[0].result, "(empty directory)");
    }
}
