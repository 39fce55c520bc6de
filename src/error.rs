//! Unified error types for the agent.

use std::fmt;

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Errors arising from a single tool invocation.
///
/// These never abort a reply: the orchestrator folds them into a tool result
/// that is shown to the model on the next turn.
#[derive(Debug)]
pub enum ToolError {
    /// One or more required parameters were absent from the call arguments.
    MissingParameters {
        /// Required parameter names that were not supplied (sorted).
        missing: Vec<String>,
        /// Argument names that were supplied (sorted).
        received: Vec<String>,
    },
    /// The model supplied arguments the tool couldn't interpret.
    InvalidArguments(String),
    /// The tool ran but encountered a failure.
    ExecutionFailed(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameters { missing, received } => write!(
                f,
                "missing parameters: {}. received parameters: {}",
                missing.join(", "),
                received.join(", ")
            ),
            Self::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            Self::ExecutionFailed(msg) => write!(f, "execution failed: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors detected while loading configuration or assembling an agent.
///
/// All of these are fatal at construction time and never retried.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
    /// Two tools serialize to the same function name.
    DuplicateToolName {
        serialized_name: String,
        first: String,
        second: String,
    },
    /// A tool declares a malformed parameter list.
    InvalidToolParameter { tool: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
            Self::DuplicateToolName {
                serialized_name,
                first,
                second,
            } => write!(
                f,
                "duplicate tool name `{serialized_name}` (from `{first}` and `{second}`)"
            ),
            Self::InvalidToolParameter { tool, reason } => {
                write!(f, "invalid parameter on tool `{tool}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the completion gateway.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: String,
        retry_after_secs: Option<u64>,
    },
    /// The response body could not be decoded.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }

    /// True for failures worth retrying: timeouts, connect errors, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(inner) => inner.is_timeout() || inner.is_connect(),
            Self::Status { code, .. } => *code == 429 || (500..=599).contains(code),
            Self::InvalidResponse(_) => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// AgentError (top-level)
// ---------------------------------------------------------------------------

/// Top-level error type for a reply.
#[derive(Debug)]
pub enum AgentError {
    Config(ConfigError),
    Api(ApiError),
    /// The tokenizer for the target model could not be loaded.
    Tokenizer(String),
    /// The model response had neither tool calls nor text content.
    UnreadableResponse(String),
    /// Even the bare system message exceeds the context limit.
    ContextLimitExceeded {
        estimated_tokens: u64,
        context_limit: u64,
    },
    /// The reply loop exceeded the configured turn cap.
    MaxIterationsReached(usize),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Tokenizer(msg) => write!(f, "tokenizer: {msg}"),
            Self::UnreadableResponse(msg) => write!(f, "model response could not be read: {msg}"),
            Self::ContextLimitExceeded {
                estimated_tokens,
                context_limit,
            } => write!(
                f,
                "context limit exceeded: {estimated_tokens} tokens > {context_limit}"
            ),
            Self::MaxIterationsReached(limit) => {
                write!(f, "max reply iterations reached ({limit})")
            }
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ConfigError> for AgentError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ApiError> for AgentError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}
