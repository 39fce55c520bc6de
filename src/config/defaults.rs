//! Default configuration constants.

/// Embedded default `neat.toml`, printed by `neat --print-config`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/neat.toml");
/// Default OpenAI-compatible API base URL.
pub(super) const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model used for agent turns.
pub(super) const DEFAULT_MODEL: &str = "gpt-4-1106-preview";
/// Env var consulted for the API key when `api_key_env` is unset.
pub(super) const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Token ceiling for one request.
pub(super) const DEFAULT_CONTEXT_LIMIT: usize = 4096;
/// Safety cap on model turns per reply.
pub(super) const DEFAULT_MAX_ITERATIONS: usize = 20;
/// Default timeout for model API requests.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
/// Default timeout for tool HTTP requests.
pub(super) const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 20;
pub(super) const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub(super) const DEFAULT_INITIAL_BACKOFF_MS: u64 = 250;
pub(super) const DEFAULT_BACKOFF_FACTOR: u32 = 4;
pub(super) const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
