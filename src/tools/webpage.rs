//! Webpage retrieval tool.
//!
//! Searches for pages, fetches each hit and extracts the text sections that
//! follow its subheadings. Pages without usable sections fall back to the
//! search snippet.

use async_trait::async_trait;
use futures::future::join_all;
use scraper::{Html, Selector};
use std::time::Duration;

use super::search::{extract_element_text, DuckDuckGo, SearchHit, USER_AGENT};
use super::{count_arg, string_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::error::ToolError;

/// Maximum characters of extracted body text kept per page.
const MAX_BODY_CHARS: usize = 1000;

/// Tool returning detailed page text for search hits.
pub struct WebpageRetrievalTool {
    engine: DuckDuckGo,
    http: reqwest::Client,
    params: Vec<ToolParam>,
}

impl WebpageRetrievalTool {
    pub fn new(engine: DuckDuckGo, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            engine,
            http,
            params: vec![
                ToolParam::required(
                    "n",
                    ParamType::Integer,
                    "The number of detailed pages to obtain. Set to higher value for greater hit rate. Default: 5.",
                ),
                ToolParam::required("query", ParamType::String, "The query to get results for."),
            ],
        }
    }

    async fn page_text(&self, hit: &SearchHit) -> String {
        let body = match self.fetch(&hit.url).await {
            Ok(html) => extract_sections(&html),
            Err(err) => {
                tracing::debug!(url = %hit.url, error = %err, "page fetch failed");
                None
            }
        };
        format!(
            "{}\n\n{}",
            hit.title,
            body.unwrap_or_else(|| hit.snippet.clone())
        )
    }

    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl Tool for WebpageRetrievalTool {
    fn name(&self) -> &str {
        "Webpage Retrieval Engine"
    }

    fn description(&self) -> &str {
        "Search with a string to retrieve detailed webpages for this query."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        let query = string_arg(arguments, "query")?;
        let n = count_arg(arguments, "n")?;
        let hits = self.engine.search(query, n).await?;
        let results = join_all(hits.iter().map(|hit| self.page_text(hit))).await;
        Ok(ToolResult::new(self.name(), results))
    }
}

/// Heading-delimited sections of a page, cleaned and truncated.
///
/// Each `h2`..`h6` heading opens a section that collects the paragraphs up
/// to the next heading. Sections without paragraphs are dropped.
fn extract_sections(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h1, h2, h3, h4, h5, h6, p").ok()?;

    let mut sections: Vec<Vec<String>> = Vec::new();
    let mut current: Option<Vec<String>> = None;
    for element in document.select(&selector) {
        let text = extract_element_text(&element);
        match element.value().name() {
            "p" => {
                if let Some(section) = current.as_mut() {
                    section.push(text);
                }
            }
            name => {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                if name != "h1" {
                    current = Some(vec![text]);
                }
            }
        }
    }
    sections.extend(current);

    let body = sections
        .into_iter()
        .filter(|section| section.len() > 1)
        .map(|section| section.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n");
    let body = clean_text(&body);
    if body.is_empty() {
        return None;
    }
    Some(truncate(&body))
}

fn clean_text(text: &str) -> String {
    let text = text.replace('\u{a0}', " ");
    let mut out = String::with_capacity(text.len());
    let mut previous_newline = false;
    for c in text.chars() {
        if c == '\n' {
            if previous_newline {
                continue;
            }
            previous_newline = true;
        } else {
            previous_newline = false;
        }
        out.push(c);
    }
    out.trim().to_string()
}

fn truncate(text: &str) -> String {
    let cut: String = text.chars().take(MAX_BODY_CHARS).collect();
    format!("{cut}...")
}
