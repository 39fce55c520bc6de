//! Per-reply working state and tool dispatch.

use crate::error::AgentError;
use crate::tools::{Arguments, ToolRegistry, ToolResult, REASONING_KEY};
use crate::types::{Message, ToolCall};
use serde_json::Value;

/// Messages and tool results accumulated while answering one query.
///
/// Lives only for the duration of a reply. `messages[0]` is always the system
/// message.
#[derive(Debug)]
pub(super) struct ReplyState {
    messages: Vec<Message>,
    batches: Vec<Vec<ToolResult>>,
    final_answer: Option<String>,
}

impl ReplyState {
    pub(super) fn new(system: Message) -> Self {
        Self {
            messages: vec![system],
            batches: Vec::new(),
            final_answer: None,
        }
    }

    pub(super) fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(super) fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    pub(super) fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Rendered results of the most recent batch, empty before any tool ran.
    pub(super) fn last_rendered(&self) -> Vec<String> {
        self.batches
            .last()
            .map(|batch| batch.iter().map(ToolResult::render).collect())
            .unwrap_or_default()
    }

    /// Store a batch; the first final result in it fixes the answer.
    pub(super) fn add_tool_results(&mut self, batch: Vec<ToolResult>) -> Option<&str> {
        if self.final_answer.is_none() {
            self.final_answer = batch.iter().find(|r| r.is_final()).map(ToolResult::render);
        }
        self.batches.push(batch);
        self.final_answer.as_deref()
    }

    #[cfg(test)]
    pub(super) fn batches(&self) -> usize {
        self.batches.len()
    }
}

/// What the loop does with a model response.
#[derive(Debug)]
pub(super) enum Turn {
    Dispatch { message: Message, calls: Vec<ToolCall> },
    Answer { message: Message, text: String },
}

pub(super) fn classify(message: Message) -> Result<Turn, AgentError> {
    if message.has_tool_calls() {
        let calls = message.tool_calls.clone().unwrap_or_default();
        return Ok(Turn::Dispatch { message, calls });
    }
    match message.content.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            let text = text.to_string();
            Ok(Turn::Answer { message, text })
        }
        _ => Err(AgentError::UnreadableResponse(
            "response carried neither tool calls nor content".into(),
        )),
    }
}

/// A tool call with its arguments decoded and the reasoning split off.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Invocation {
    pub(super) name: String,
    pub(super) arguments: Arguments,
    pub(super) reasoning: Option<String>,
}

impl Invocation {
    /// Arguments that are not a JSON object decode to an empty map.
    pub(super) fn parse(call: &ToolCall) -> Self {
        let mut arguments = match serde_json::from_str::<Value>(&call.function.arguments) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::debug!(
                    tool = %call.function.name,
                    "tool arguments are not a JSON object, treating as empty"
                );
                Arguments::new()
            }
        };
        let reasoning = arguments.remove(REASONING_KEY).map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        });
        Self {
            name: call.function.name.clone(),
            arguments,
            reasoning,
        }
    }

    /// Arguments as shown to observers, without the reasoning.
    pub(super) fn display_arguments(&self) -> String {
        Value::Object(self.arguments.clone()).to_string()
    }
}

/// Run one invocation. Never fails: errors become readable results.
pub(super) async fn dispatch(registry: &ToolRegistry, invocation: &Invocation) -> ToolResult {
    let Some(capability) = registry.resolve(&invocation.name) else {
        tracing::warn!(tool = %invocation.name, "model requested an unknown tool");
        return ToolResult::empty(invocation.name.clone());
    };
    match capability.run(&invocation.arguments).await {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(tool = capability.name(), error = %err, "tool failed");
            ToolResult::new(capability.name(), vec![format!("Tool error: {err}")])
        }
    }
}
