//! Shared test fixtures for agent, tool, and gateway test modules.
//!
//! Mock model clients, a trivial echo tool, and response builders live here so
//! each test module does not rebuild them.

use crate::api::ModelClient;
use crate::error::{ApiError, ToolError};
use crate::tools::{string_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::types::{ChatRequest, ChatResponse, Choice, FunctionCall, Message, Role, ToolCall, Usage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("neat-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

// ---------------------------------------------------------------------------
// Model clients
// ---------------------------------------------------------------------------

/// Model client that replays canned responses in FIFO order.
pub struct MockClient {
    responses: StdMutex<VecDeque<ChatResponse>>,
}

impl MockClient {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: StdMutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("no mock response queued".to_string()))
    }
}

/// Model client that records incoming requests for later assertions.
///
/// Cloning shares the queue and the capture log, so a test can keep a handle
/// after boxing one into an agent.
#[derive(Clone)]
pub struct RecordingClient {
    responses: Arc<StdMutex<VecDeque<ChatResponse>>>,
    requests: Arc<StdMutex<Vec<ChatRequest>>>,
}

impl RecordingClient {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Arc::new(StdMutex::new(responses.into())),
            requests: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    /// Cloned snapshot of all captured requests.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ModelClient for RecordingClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("no mock response queued".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Response builders
// ---------------------------------------------------------------------------

fn response_with(message: Message) -> ChatResponse {
    ChatResponse {
        id: "resp".into(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some("stop".into()),
        }],
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// Plain assistant answer.
pub fn text_response(content: &str) -> ChatResponse {
    response_with(Message::assistant(content))
}

/// Assistant message requesting the given `(name, arguments)` calls.
pub fn tool_call_response(calls: &[(&str, &str)]) -> ChatResponse {
    let tool_calls = calls
        .iter()
        .enumerate()
        .map(|(i, (name, arguments))| ToolCall {
            id: format!("call_{i}"),
            call_type: "function".into(),
            function: FunctionCall {
                name: (*name).to_string(),
                arguments: (*arguments).to_string(),
            },
        })
        .collect();
    response_with(Message {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(tool_calls),
    })
}

/// Response whose message carries neither content nor tool calls.
pub fn blank_response() -> ChatResponse {
    response_with(Message {
        role: Role::Assistant,
        content: None,
        tool_calls: None,
    })
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Tool that returns its `text` argument verbatim.
pub struct EchoTool {
    name: String,
    params: Vec<ToolParam>,
    is_final: bool,
    calls: Arc<AtomicUsize>,
}

impl EchoTool {
    pub fn named(name: &str) -> Self {
        Self::with_params(
            name,
            vec![ToolParam::required("text", ParamType::String, "Text to echo back.")],
        )
    }

    pub fn with_params(name: &str, params: Vec<ToolParam>) -> Self {
        Self {
            name: name.to_string(),
            params,
            is_final: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mark every result from this tool as final.
    pub fn finishing(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Shared counter of executions.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echo the given text."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let results = match string_arg(arguments, "text") {
            Ok(text) => vec![text.to_string()],
            Err(_) => Vec::new(),
        };
        let result = ToolResult::new(self.name.clone(), results);
        Ok(if self.is_final {
            result.into_final()
        } else {
            result
        })
    }
}

/// Tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "Broken"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    fn params(&self) -> &[ToolParam] {
        &[]
    }

    async fn execute(&self, _arguments: &Arguments) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed("backend unavailable".into()))
    }
}
