//! Private document search tool.
//!
//! The tool delegates retrieval to a [`DocumentIndex`]. [`KeywordIndex`] is
//! the bundled in-memory implementation: it splits plain-text files into
//! paragraph chunks and ranks them by query-term overlap.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use super::{count_arg, string_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::error::{ConfigError, ToolError};

/// File extensions picked up by [`KeywordIndex::from_dir`].
const INDEXED_EXTENSIONS: &[&str] = &["txt", "md"];

/// One ranked chunk returned by a document index.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHit {
    pub content: String,
    pub score: f64,
}

/// Searchable document store.
pub trait DocumentIndex: Send + Sync {
    fn search(&self, query: &str) -> Vec<DocumentHit>;
}

/// Tool exposing a [`DocumentIndex`] to the model.
pub struct DocumentSearchTool {
    index: Arc<dyn DocumentIndex>,
    params: Vec<ToolParam>,
}

impl DocumentSearchTool {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self {
            index,
            params: vec![
                ToolParam::required(
                    "n",
                    ParamType::Integer,
                    "The number of search results to obtain. Set to higher value for greater hit rate. Default: 3.",
                ),
                ToolParam::required(
                    "query",
                    ParamType::String,
                    "The query to call the document database with. Formulate verbosely and precisely.",
                ),
            ],
        }
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn name(&self) -> &str {
        "Document Search"
    }

    fn description(&self) -> &str {
        "Find documents from a private document base."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        let query = string_arg(arguments, "query")?;
        let n = count_arg(arguments, "n")?;

        let mut hits = self.index.search(query);
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        let results = hits.into_iter().take(n).map(|hit| hit.content).collect();
        Ok(ToolResult::new(self.name(), results))
    }
}

// ---------------------------------------------------------------------------
// Keyword index
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Chunk {
    content: String,
    terms: BTreeSet<String>,
}

/// In-memory term-overlap index over paragraph chunks.
#[derive(Debug, Default)]
pub struct KeywordIndex {
    chunks: Vec<Chunk>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, split into paragraphs at blank lines.
    pub fn add_document(&mut self, text: &str) {
        for paragraph in text.split("\n\n") {
            let content = paragraph.trim();
            if content.is_empty() {
                continue;
            }
            self.chunks.push(Chunk {
                content: content.to_string(),
                terms: terms(content),
            });
        }
    }

    /// Index every `.txt` and `.md` file directly under `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let indexed = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| INDEXED_EXTENSIONS.contains(&ext));
            if path.is_file() && indexed {
                paths.push(path);
            }
        }
        paths.sort();

        let mut index = Self::new();
        for path in &paths {
            index.add_document(&std::fs::read_to_string(path)?);
        }
        tracing::debug!(
            dir = %dir.display(),
            files = paths.len(),
            chunks = index.len(),
            "document index loaded"
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl DocumentIndex for KeywordIndex {
    /// Chunks sharing at least one term with the query, scored by the
    /// fraction of query terms they contain.
    fn search(&self, query: &str) -> Vec<DocumentHit> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }
        self.chunks
            .iter()
            .filter_map(|chunk| {
                let overlap = query_terms.intersection(&chunk.terms).count();
                (overlap > 0).then(|| DocumentHit {
                    content: chunk.content.clone(),
                    score: overlap as f64 / query_terms.len() as f64,
                })
            })
            .collect()
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}
