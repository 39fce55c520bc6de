//! Core agentic loop.
//!
//! The [`Agent`] answers one query at a time. Each reply alternates between
//! asking the model for a decision and dispatching the tool calls it makes,
//! until the model answers in text or a tool returns a final result.
//!
//! Replies are lazy streams of [`AgentEvent`]s: nothing runs until the stream
//! is polled, and dropping it abandons the reply without touching history.

use crate::api::ModelClient;
use crate::config::Config;
use crate::error::AgentError;
use crate::history::ConversationHistory;
use crate::prompt;
use crate::tokens::{self, TiktokenCounter, TokenCounter, TokenTracker};
use crate::tools::ToolRegistry;
use crate::types::{ChatRequest, ChatResponse, Message};
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use std::sync::{Arc, Mutex};

mod events;
mod state;

pub use events::AgentEvent;
use state::{classify, dispatch, Invocation, ReplyState, Turn};

/// Knobs for a single agent, resolved from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub model: String,
    /// Publish and require the `reasoning` argument on every tool.
    pub require_reasoning: bool,
    /// Token ceiling for each request.
    pub context_limit: usize,
    /// Model turns allowed per reply.
    pub max_iterations: usize,
    pub temperature: f64,
    /// Fully rendered system message.
    pub system_prompt: String,
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        let system_prompt = match config.agent.system_prompt.as_deref() {
            Some(custom) if !custom.trim().is_empty() => custom.trim().to_string(),
            _ => prompt::render_system_prompt(config.agent.instructions.as_deref()),
        };
        Self {
            model: config.api.model.clone(),
            require_reasoning: config.agent.require_reasoning,
            context_limit: config.api.context_limit,
            max_iterations: config.agent.max_iterations,
            temperature: config.api.temperature,
            system_prompt,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The orchestrator: owns the tool set and drives replies.
pub struct Agent {
    client: Arc<dyn ModelClient>,
    registry: ToolRegistry,
    history: ConversationHistory,
    settings: AgentSettings,
    counter: Box<dyn TokenCounter>,
    usage: Mutex<TokenTracker>,
}

impl Agent {
    /// Build an agent that counts tokens with the model's BPE tokenizer.
    pub fn new(
        client: Arc<dyn ModelClient>,
        registry: ToolRegistry,
        history: ConversationHistory,
        settings: AgentSettings,
    ) -> Result<Self, AgentError> {
        let counter = TiktokenCounter::for_model(&settings.model)?;
        Ok(Self::with_counter(
            client,
            registry,
            history,
            settings,
            Box::new(counter),
        ))
    }

    pub fn with_counter(
        client: Arc<dyn ModelClient>,
        registry: ToolRegistry,
        history: ConversationHistory,
        settings: AgentSettings,
        counter: Box<dyn TokenCounter>,
    ) -> Self {
        Self {
            client,
            registry,
            history,
            settings,
            counter,
            usage: Mutex::new(TokenTracker::new()),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Provider-reported usage accumulated across all replies.
    pub fn usage(&self) -> TokenTracker {
        self.usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Answer `query`, streaming each step.
    ///
    /// Per tool invocation the stream yields a `Thought` before the tool runs
    /// and a `FunctionCall` once the whole batch has finished. A successful
    /// reply ends with exactly one `Answer`, after the query and the final
    /// assistant message have been appended to the shared history.
    pub fn reply_to<'a>(
        &'a self,
        query: &'a str,
    ) -> impl Stream<Item = Result<AgentEvent, AgentError>> + 'a {
        try_stream! {
            let mut state = ReplyState::new(Message::system(self.settings.system_prompt.clone()));
            let definitions = self.registry.definitions(self.settings.require_reasoning);
            let tools = (!definitions.is_empty()).then_some(definitions);
            let mut turn = 0usize;

            let (answer, last_message) = loop {
                turn += 1;
                if turn > self.settings.max_iterations {
                    Err::<(), _>(AgentError::MaxIterationsReached(self.settings.max_iterations))?;
                }

                let user_turn = prompt::render_user_turn(query, &state.last_rendered());
                state.add_message(Message::user(user_turn));
                tokens::trim_to_budget(
                    state.messages_mut(),
                    self.counter.as_ref(),
                    self.settings.context_limit,
                )?;

                let request = ChatRequest {
                    model: self.settings.model.clone(),
                    messages: state.messages().to_vec(),
                    tools: tools.clone(),
                    temperature: Some(self.settings.temperature),
                };
                tracing::info!(turn, messages = request.messages.len(), "requesting model decision");
                let response = self.client.chat(&request).await?;
                self.record_usage(&response);
                let message = first_message(response)?;

                match classify(message)? {
                    Turn::Answer { message, text } => break (text, message),
                    Turn::Dispatch { message, calls } => {
                        let reduced = message.to_text_message();
                        state.add_message(reduced.clone());

                        let mut batch = Vec::with_capacity(calls.len());
                        let mut shown = Vec::with_capacity(calls.len());
                        for call in &calls {
                            let invocation = Invocation::parse(call);
                            yield AgentEvent::Thought { text: invocation.reasoning.clone() };
                            tracing::info!(tool = %invocation.name, "dispatching tool call");
                            batch.push(dispatch(&self.registry, &invocation).await);
                            shown.push(invocation.display_arguments());
                        }
                        for (arguments, result) in shown.iter().zip(&batch) {
                            yield AgentEvent::FunctionCall {
                                text: format!("Query:\n{arguments}\n\n{}", result.render()),
                            };
                        }

                        if let Some(answer) = state.add_tool_results(batch) {
                            tracing::info!(turn, "tool produced the final answer");
                            break (answer.to_string(), reduced);
                        }
                    }
                }
            };

            self.history.append_exchange(Message::user(query), last_message);
            yield AgentEvent::Answer { text: answer };
        }
    }

    /// Drain [`Agent::reply_to`] and return only the answer.
    pub async fn reply(&self, query: &str) -> Result<String, AgentError> {
        let stream = self.reply_to(query);
        futures::pin_mut!(stream);
        let mut answer = None;
        while let Some(event) = stream.next().await {
            if let AgentEvent::Answer { text } = event? {
                answer = Some(text);
            }
        }
        answer.ok_or_else(|| AgentError::UnreadableResponse("reply ended without an answer".into()))
    }

    fn record_usage(&self, response: &ChatResponse) {
        let Some(usage) = &response.usage else {
            return;
        };
        let mut tracker = self
            .usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracker.record(usage.prompt_tokens, usage.completion_tokens);
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            session_total = tracker.session_total(),
            "token usage"
        );
    }
}

fn first_message(response: ChatResponse) -> Result<Message, AgentError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| AgentError::UnreadableResponse("response contained no choices".into()))
}
