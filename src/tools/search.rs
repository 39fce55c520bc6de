//! Web search tool.
//!
//! Searches DuckDuckGo's HTML endpoint (no API key required) and extracts
//! result titles, URLs, and snippets from the response. The same backend
//! feeds the webpage retrieval tool.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

use super::{count_arg, string_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::error::ToolError;

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible; neat-agent/0.1)";

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// DuckDuckGo HTML search client.
#[derive(Clone)]
pub struct DuckDuckGo {
    http: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGo {
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoint(DDG_HTML_ENDPOINT, timeout)
    }

    /// Search against a different HTML endpoint.
    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }

    /// Up to `limit` results for `query`.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ToolError> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}?q={}", self.endpoint, urlencoded(query));
        let html = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let hits = parse_ddg_results(&html, limit);
        if hits.is_empty() && !looks_like_no_results(&html) {
            tracing::warn!(query, "DuckDuckGo returned a page without parseable results");
        }
        Ok(hits)
    }
}

/// Tool returning search result titles and snippets.
pub struct WebSearchTool {
    engine: DuckDuckGo,
    params: Vec<ToolParam>,
}

impl WebSearchTool {
    pub fn new(engine: DuckDuckGo) -> Self {
        Self {
            engine,
            params: vec![
                ToolParam::required(
                    "n",
                    ParamType::Integer,
                    "The number of pages to obtain. Set to higher value for greater hit rate. Default: 5.",
                ),
                ToolParam::required(
                    "query",
                    ParamType::String,
                    "A query to search the internet with.",
                ),
            ],
        }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(DuckDuckGo::new(Duration::from_secs(15)))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "DuckDuckGo Search Engine"
    }

    fn description(&self) -> &str {
        "Find information directly from the internet."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        let query = string_arg(arguments, "query")?;
        let n = count_arg(arguments, "n")?;
        let results = self
            .engine
            .search(query, n)
            .await?
            .into_iter()
            .map(|hit| format!("{}\n{}", hit.title, hit.snippet))
            .collect();
        Ok(ToolResult::new(self.name(), results))
    }
}

/// Parse DuckDuckGo HTML results using CSS selectors.
fn parse_ddg_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(result_selector), Ok(link_selector), Ok(snippet_selector)) = (
        Selector::parse(".result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut results = Vec::new();

    // Preferred path: parse from stable result containers.
    for result in document.select(&result_selector) {
        if results.len() >= limit {
            break;
        }
        let Some(link) = result.select(&link_selector).next() else {
            continue;
        };

        let title = extract_element_text(&link);
        let url = link
            .value()
            .attr("href")
            .map(decode_html_entities)
            .unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }

        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(|elem| decode_html_entities(&extract_element_text(&elem)))
            .unwrap_or_default();

        results.push(SearchHit {
            title: decode_html_entities(&title),
            url,
            snippet,
        });
    }

    if !results.is_empty() {
        return results;
    }

    // Fallback path: if container classes move, still try link extraction.
    for link in document.select(&link_selector) {
        if results.len() >= limit {
            break;
        }
        let title = extract_element_text(&link);
        let url = link
            .value()
            .attr("href")
            .map(decode_html_entities)
            .unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchHit {
            title: decode_html_entities(&title),
            url,
            snippet: String::new(),
        });
    }

    results
}

pub(crate) fn extract_element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn looks_like_no_results(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    lower.contains("no results") || lower.contains("did not match")
}

/// Minimal URL encoding for the query string.
fn urlencoded(s: &str) -> String {
    let mut out = String::new();
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

/// Decode common HTML entities.
fn decode_html_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
