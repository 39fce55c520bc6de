//! Configuration data model.
//!
//! Struct definitions plus default values. Source discovery and environment
//! overrides live in sibling modules.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_API_BASE_URL, DEFAULT_API_KEY_ENV, DEFAULT_API_TIMEOUT_SECS, DEFAULT_BACKOFF_FACTOR,
    DEFAULT_CONTEXT_LIMIT, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKOFF_MS, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, DEFAULT_TOOL_TIMEOUT_SECS,
};
use crate::tools::writer::DEFAULT_WRITER_MODEL;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,
    pub agent: AgentConfig,
    pub network: NetworkConfig,
    pub tools: ToolsConfig,
}

/// Model endpoint settings under `[api]`.
///
/// After loading, `api_key` holds the resolved key: the literal value if one
/// was configured, otherwise the contents of the `api_key_env` variable.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Env var holding the key; defaults to `OPENAI_API_KEY`.
    pub api_key_env: Option<String>,
    pub model: String,
    /// Token ceiling enforced on every request.
    pub context_limit: usize,
    pub temperature: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            api_key: String::new(),
            api_key_env: None,
            model: DEFAULT_MODEL.into(),
            context_limit: DEFAULT_CONTEXT_LIMIT,
            temperature: 0.0,
        }
    }
}

impl ApiConfig {
    pub(super) fn key_env_name(&self) -> &str {
        self.api_key_env
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_API_KEY_ENV)
    }
}

/// Orchestrator behavior under `[agent]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Publish and require the synthetic `reasoning` argument on every tool.
    pub require_reasoning: bool,
    pub max_iterations: usize,
    /// Replaces the built-in system message when set.
    pub system_prompt: Option<String>,
    /// Appended to the built-in system message.
    pub instructions: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            require_reasoning: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: None,
            instructions: None,
        }
    }
}

/// Timeouts and retry settings under `[network]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub api_timeout_secs: u64,
    pub tool_timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_factor: u32,
    pub max_backoff_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

/// Tool toggles and credentials under `[tools]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub search_enabled: bool,
    pub webpage_enabled: bool,
    pub history_enabled: bool,
    /// Directory of `.txt`/`.md` files for the document search tool.
    pub documents_dir: Option<PathBuf>,
    /// OpenWeatherMap key; the weather tool is registered only when one resolves.
    pub weather_api_key: Option<String>,
    pub weather_api_key_env: Option<String>,
    /// SEO writer settings; the writer is registered only when present.
    pub writer: Option<WriterConfig>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_enabled: true,
            webpage_enabled: true,
            history_enabled: true,
            documents_dir: None,
            weather_api_key: None,
            weather_api_key_env: None,
            writer: None,
        }
    }
}

/// `[tools.writer]`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WriterConfig {
    pub company_name: String,
    #[serde(default)]
    pub company_description: String,
    #[serde(default = "default_writer_model")]
    pub model: String,
}

fn default_writer_model() -> String {
    DEFAULT_WRITER_MODEL.to_string()
}
