//! Token counting, context budget enforcement, and usage tracking.
//!
//! Requests are trimmed before they are sent: while the message list is over
//! the context limit, the oldest non-system message is evicted. Exact counts
//! come from the model's BPE tokenizer via `tiktoken-rs`; a character
//! heuristic is available where the tokenizer is not wanted.

use crate::error::AgentError;
use crate::types::Message;
use tiktoken_rs::CoreBPE;

/// Per-message framing tokens in the OpenAI chat format.
const TOKENS_PER_MESSAGE: usize = 4;
/// Every reply is primed with `<|start|>assistant<|message|>`.
const REPLY_PRIMING_TOKENS: usize = 2;

/// Counts how many prompt tokens a message list consumes.
pub trait TokenCounter: Send + Sync {
    fn count_messages(&self, messages: &[Message]) -> usize;
}

/// BPE-exact counter for OpenAI chat models.
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Tokenizer for `model`, falling back to `cl100k_base` for unknown names.
    pub fn for_model(model: &str) -> Result<Self, AgentError> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(err) => {
                tracing::debug!(model, error = %err, "no model tokenizer, using cl100k_base");
                tiktoken_rs::cl100k_base().map_err(|e| AgentError::Tokenizer(e.to_string()))?
            }
        };
        Ok(Self { bpe })
    }

    fn count_text(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_messages(&self, messages: &[Message]) -> usize {
        messages
            .iter()
            .map(|m| TOKENS_PER_MESSAGE + self.count_text(m.role.as_str()) + self.count_text(&m.text()))
            .sum::<usize>()
            + REPLY_PRIMING_TOKENS
    }
}

/// Rough estimate: ~1 token per 4 characters plus framing overhead.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count_messages(&self, messages: &[Message]) -> usize {
        messages
            .iter()
            .map(|m| TOKENS_PER_MESSAGE + (m.role.as_str().len() + m.text().len()).div_ceil(4))
            .sum::<usize>()
            + REPLY_PRIMING_TOKENS
    }
}

/// Evict messages at index 1 until the list fits within `limit` tokens.
///
/// Returns the evicted messages in eviction order. Index 0 is the system
/// message and is never evicted; if it alone is over the limit the request
/// cannot be built and `ContextLimitExceeded` is returned.
pub fn trim_to_budget(
    messages: &mut Vec<Message>,
    counter: &dyn TokenCounter,
    limit: usize,
) -> Result<Vec<Message>, AgentError> {
    let mut evicted = Vec::new();
    let mut count = counter.count_messages(messages);
    while count > limit {
        if messages.len() <= 1 {
            return Err(AgentError::ContextLimitExceeded {
                estimated_tokens: count as u64,
                context_limit: limit as u64,
            });
        }
        evicted.push(messages.remove(1));
        count = counter.count_messages(messages);
    }
    if !evicted.is_empty() {
        tracing::debug!(
            evicted = evicted.len(),
            remaining = messages.len(),
            tokens = count,
            limit,
            "trimmed request to context budget"
        );
    }
    Ok(evicted)
}

/// Tracks provider-reported token usage across a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTracker {
    /// Running total of prompt tokens sent.
    pub total_prompt_tokens: u64,
    /// Running total of completion tokens received.
    pub total_completion_tokens: u64,
    /// Prompt tokens in the most recent request.
    pub last_prompt_tokens: u64,
    /// Completion tokens in the most recent response.
    pub last_completion_tokens: u64,
    /// Number of completion requests recorded.
    pub requests: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token counts from an API response's `usage` field.
    pub fn record(&mut self, prompt_tokens: u64, completion_tokens: u64) {
        self.last_prompt_tokens = prompt_tokens;
        self.last_completion_tokens = completion_tokens;
        self.total_prompt_tokens = self.total_prompt_tokens.saturating_add(prompt_tokens);
        self.total_completion_tokens = self
            .total_completion_tokens
            .saturating_add(completion_tokens);
        self.requests = self.requests.saturating_add(1);
    }

    /// Total tokens consumed across the entire session.
    pub fn session_total(&self) -> u64 {
        self.total_prompt_tokens
            .saturating_add(self.total_completion_tokens)
    }
}
