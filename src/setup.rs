//! Assemble a ready-to-run agent from configuration.

use crate::agent::{Agent, AgentSettings};
use crate::api::{ApiClient, ModelClient, RetryPolicy};
use crate::config::Config;
use crate::error::{AgentError, ConfigError};
use crate::history::ConversationHistory;
use crate::tools::documents::{DocumentSearchTool, KeywordIndex};
use crate::tools::history::QueryConversationHistoryTool;
use crate::tools::search::{DuckDuckGo, WebSearchTool};
use crate::tools::weather::WeatherRetrievalTool;
use crate::tools::webpage::WebpageRetrievalTool;
use crate::tools::writer::{ContentWriterTool, WriterProfile};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Register every tool the configuration enables.
///
/// The weather tool needs a resolved key and the writer needs a
/// `[tools.writer]` section; both are skipped silently otherwise.
pub fn build_registry(
    config: &Config,
    client: Arc<dyn ModelClient>,
    history: &ConversationHistory,
) -> Result<ToolRegistry, ConfigError> {
    let tools = &config.tools;
    let timeout = Duration::from_secs(config.network.tool_timeout_secs.max(1));
    let mut registry = ToolRegistry::new();

    if tools.history_enabled {
        registry.register(QueryConversationHistoryTool::new(history.clone()))?;
    }
    if let Some(dir) = &tools.documents_dir {
        let index = KeywordIndex::from_dir(dir)?;
        tracing::info!(dir = %dir.display(), paragraphs = index.len(), "document index loaded");
        registry.register(DocumentSearchTool::new(Arc::new(index)))?;
    }
    if tools.search_enabled {
        registry.register(WebSearchTool::new(DuckDuckGo::new(timeout)))?;
    }
    if tools.webpage_enabled {
        registry.register(WebpageRetrievalTool::new(DuckDuckGo::new(timeout), timeout))?;
    }
    match tools.weather_api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            registry.register(WeatherRetrievalTool::new(key, timeout))?;
        }
        _ => tracing::debug!("no weather API key, weather tool disabled"),
    }
    if let Some(writer) = &tools.writer {
        let profile = WriterProfile {
            company_name: writer.company_name.clone(),
            company_description: writer.company_description.clone(),
            model: writer.model.clone(),
        };
        registry.register(ContentWriterTool::new(client, profile))?;
    }
    Ok(registry)
}

/// Build the HTTP client, tool registry and agent described by `config`.
pub fn build_agent(config: &Config) -> Result<Agent, AgentError> {
    let client: Arc<dyn ModelClient> = Arc::new(ApiClient::new_with_retry_policy(
        &config.api,
        Duration::from_secs(config.network.api_timeout_secs.max(1)),
        RetryPolicy::from(&config.network),
    ));
    let history = ConversationHistory::new();
    let registry = build_registry(config, Arc::clone(&client), &history)?;
    tracing::debug!(
        tools = ?registry.iter().map(|c| c.serialized_name()).collect::<Vec<_>>(),
        "tool registry assembled"
    );
    Agent::new(client, registry, history, AgentSettings::from_config(config))
}
