//! Environment overrides and secret resolution.
//!
//! `NEAT_*` variables override file values. API keys are resolved once here
//! and passed explicitly into constructors afterwards.

use crate::error::ConfigError;

use super::Config;

/// Fill `api.api_key` and `tools.weather_api_key` from the environment.
///
/// Precedence for the API key: `NEAT_API_KEY`, then a literal `api_key`, then
/// the variable named by `api_key_env` (default `OPENAI_API_KEY`).
pub(super) fn resolve_secrets<FEnv>(config: &mut Config, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(key) = non_empty(env_lookup("NEAT_API_KEY")) {
        config.api.api_key = key;
    } else if config.api.api_key.trim().is_empty() {
        config.api.api_key =
            non_empty(env_lookup(config.api.key_env_name())).unwrap_or_default();
    }

    let tools = &mut config.tools;
    if non_empty(tools.weather_api_key.clone()).is_none() {
        tools.weather_api_key = tools
            .weather_api_key_env
            .as_deref()
            .and_then(|name| non_empty(env_lookup(name)));
    }
}

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(env_lookup("NEAT_BASE_URL")) {
        config.api.base_url = url;
    }
    if let Some(model) = non_empty(env_lookup("NEAT_MODEL")) {
        config.api.model = model;
    }
    if let Some(timeout) = non_empty(env_lookup("NEAT_API_TIMEOUT_SECS")) {
        // Clamp to at least 1 second to avoid "no-timeout" accidental behavior.
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid NEAT_API_TIMEOUT_SECS value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        config.network.api_timeout_secs = parsed.max(1);
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
