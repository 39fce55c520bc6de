//! Conversation history lookup tool.

use async_trait::async_trait;

use super::{count_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::error::ToolError;
use crate::history::ConversationHistory;

/// Lets the model pull earlier turns back into context.
pub struct QueryConversationHistoryTool {
    history: ConversationHistory,
    params: Vec<ToolParam>,
}

impl QueryConversationHistoryTool {
    pub fn new(history: ConversationHistory) -> Self {
        Self {
            history,
            params: vec![ToolParam::required(
                "n",
                ParamType::Integer,
                "The number of last messages to retrieve. Default: 4.",
            )],
        }
    }
}

#[async_trait]
impl Tool for QueryConversationHistoryTool {
    fn name(&self) -> &str {
        "Retrieve Conversation History"
    }

    fn description(&self) -> &str {
        "If a question is lacking context, retrieve the prior conversation history to gather more information."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        let n = count_arg(arguments, "n")?;
        Ok(ToolResult::new(
            self.name(),
            self.history.get_as_string_list(n),
        ))
    }
}
