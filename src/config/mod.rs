//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`NEAT_API_KEY`, `NEAT_BASE_URL`, `NEAT_MODEL`,
//!    `NEAT_API_TIMEOUT_SECS`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./neat.toml in the current directory
//! 4. $XDG_CONFIG_HOME/neat/neat.toml (or ~/.config/neat/neat.toml)
//! 5. Built-in defaults
//!
//! CLI flags are applied on top by the binary.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

mod defaults;
mod env;
mod sources;
mod types;

pub use defaults::DEFAULT_CONFIG_TEMPLATE;
pub use sources::{config_root_dir, ConfigSource};
pub use types::{AgentConfig, ApiConfig, Config, NetworkConfig, ToolsConfig, WriterConfig};

/// Loaded configuration plus the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(crate) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        sources::read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    env::resolve_secrets(&mut config, &env_lookup);
    env::apply_runtime_env_overrides(&mut config, &env_lookup)?;
    config.validate()?;
    tracing::debug!(?source, model = %config.api.model, "configuration loaded");
    Ok(LoadedConfig { config, source })
}

impl Config {
    /// Reject values the agent cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        if self.api.model.trim().is_empty() {
            return Err(ConfigError::Invalid("api.model must not be empty".into()));
        }
        if self.api.context_limit == 0 {
            return Err(ConfigError::Invalid("api.context_limit must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.api.temperature) {
            return Err(ConfigError::Invalid(format!(
                "api.temperature must be within 0.0..=2.0, got {}",
                self.api.temperature
            )));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid("agent.max_iterations must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(
        path_override: Option<&Path>,
        files: &[(&str, &str)],
        vars: &[(&str, &str)],
    ) -> Result<LoadedConfig, ConfigError> {
        let files: HashMap<PathBuf, String> = files
            .iter()
            .map(|(p, t)| (PathBuf::from(p), t.to_string()))
            .collect();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from_sources(
            path_override,
            |path| {
                files.get(path).cloned().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing")
                })
            },
            |name| vars.get(name).cloned(),
            || Some(PathBuf::from("/cfg")),
        )
    }

    #[test]
    fn defaults_when_no_file() {
        let loaded = load_with(None, &[], &[]).unwrap();
        assert_eq!(loaded.source, ConfigSource::BuiltInDefaults);
        let config = loaded.config;
        assert_eq!(config.api.model, "gpt-4-1106-preview");
        assert_eq!(config.api.context_limit, 4096);
        assert_eq!(config.api.temperature, 0.0);
        assert!(config.agent.require_reasoning);
        assert_eq!(config.agent.max_iterations, 20);
        assert_eq!(config.network.max_attempts, 5);
        assert_eq!(config.network.backoff_factor, 4);
        assert!(config.tools.search_enabled);
        assert!(config.tools.writer.is_none());
        assert!(config.api.api_key.is_empty());
    }

    #[test]
    fn bundled_template_parses_to_defaults() {
        let mut parsed: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed.api.api_key_env.take().as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn local_file_beats_global_file() {
        let loaded = load_with(
            None,
            &[
                ("neat.toml", "[api]\nmodel = \"local\""),
                ("/cfg/neat/neat.toml", "[api]\nmodel = \"global\""),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(loaded.source, ConfigSource::Local);
        assert_eq!(loaded.config.api.model, "local");

        let loaded = load_with(None, &[("/cfg/neat/neat.toml", "[api]\nmodel = \"global\"")], &[])
            .unwrap();
        assert_eq!(loaded.config.api.model, "global");
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_with(Some(Path::new("custom.toml")), &[], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let loaded = load_with(
            Some(Path::new("custom.toml")),
            &[("custom.toml", "[api]\nmodel = \"file\"\nbase_url = \"http://file\"")],
            &[
                ("NEAT_MODEL", "env-model"),
                ("NEAT_BASE_URL", "http://env"),
                ("NEAT_API_TIMEOUT_SECS", "0"),
            ],
        )
        .unwrap();
        assert_eq!(loaded.config.api.model, "env-model");
        assert_eq!(loaded.config.api.base_url, "http://env");
        assert_eq!(loaded.config.network.api_timeout_secs, 1);
    }

    #[test]
    fn invalid_timeout_env_is_rejected() {
        let err = load_with(None, &[], &[("NEAT_API_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("NEAT_API_TIMEOUT_SECS"));
    }

    #[test]
    fn api_key_resolution_order() {
        let from_default_env = load_with(None, &[], &[("OPENAI_API_KEY", "sk-openai")]).unwrap();
        assert_eq!(from_default_env.config.api.api_key, "sk-openai");

        let named = load_with(
            None,
            &[("neat.toml", "[api]\napi_key_env = \"MY_KEY\"")],
            &[("MY_KEY", "sk-mine"), ("OPENAI_API_KEY", "sk-openai")],
        )
        .unwrap();
        assert_eq!(named.config.api.api_key, "sk-mine");

        let literal = load_with(
            None,
            &[("neat.toml", "[api]\napi_key = \"sk-file\"")],
            &[("OPENAI_API_KEY", "sk-openai")],
        )
        .unwrap();
        assert_eq!(literal.config.api.api_key, "sk-file");

        let neat = load_with(
            None,
            &[("neat.toml", "[api]\napi_key = \"sk-file\"")],
            &[("NEAT_API_KEY", "sk-neat")],
        )
        .unwrap();
        assert_eq!(neat.config.api.api_key, "sk-neat");
    }

    #[test]
    fn weather_key_from_named_env() {
        let loaded = load_with(
            None,
            &[("neat.toml", "[tools]\nweather_api_key_env = \"OWM\"")],
            &[("OWM", "owm-key")],
        )
        .unwrap();
        assert_eq!(loaded.config.tools.weather_api_key.as_deref(), Some("owm-key"));
    }

    #[test]
    fn writer_section_fills_defaults() {
        let loaded = load_with(
            None,
            &[("neat.toml", "[tools.writer]\ncompany_name = \"Acme\"")],
            &[],
        )
        .unwrap();
        let writer = loaded.config.tools.writer.unwrap();
        assert_eq!(writer.company_name, "Acme");
        assert_eq!(writer.model, "gpt-3.5-turbo");
    }

    #[test]
    fn unknown_keys_and_bad_values_are_errors() {
        assert!(matches!(
            load_with(None, &[("neat.toml", "[api]\nmodle = \"x\"")], &[]),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            load_with(None, &[("neat.toml", "[api]\ncontext_limit = 0")], &[]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_with(None, &[("neat.toml", "[agent]\nmax_iterations = 0")], &[]),
            Err(ConfigError::Invalid(_))
        ));
    }
}
