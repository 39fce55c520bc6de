//! Observable events produced while answering a query.

use serde::{Deserialize, Serialize};

/// One step of a reply, in emission order.
///
/// Serializes as `{"type": "thought" | "function_call" | "answer", "text": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The model's stated reason for a tool call. `None` when it gave none.
    Thought { text: Option<String> },
    /// Arguments and rendered result of one tool invocation.
    FunctionCall { text: String },
    /// The final answer. Always the last event of a successful reply.
    Answer { text: String },
}

impl AgentEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Thought { .. } => "thought",
            Self::FunctionCall { .. } => "function_call",
            Self::Answer { .. } => "answer",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Thought { text } => text.as_deref(),
            Self::FunctionCall { text } | Self::Answer { text } => Some(text),
        }
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }
}
