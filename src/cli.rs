//! CLI argument parsing via clap.

use clap::Parser;
use neat_agent::config::Config;
use std::path::PathBuf;

/// A tool-using assistant for the terminal. Works with any OpenAI-compatible API.
#[derive(Debug, Parser)]
#[command(name = "neat", version)]
pub struct Args {
    /// Question to answer. If provided, runs in one-shot mode and exits;
    /// otherwise questions are read from stdin, one per line.
    pub prompt: Option<String>,

    /// Path to config file (default: ./neat.toml or ~/.config/neat/neat.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Index `.txt`/`.md` files in DIR for the document search tool.
    #[arg(long = "documents", value_name = "DIR")]
    pub documents: Option<PathBuf>,

    /// Do not require the model to state its reasoning on tool calls.
    #[arg(long = "no-reasoning")]
    pub no_reasoning: bool,

    /// Print every event as a JSON line.
    #[arg(long = "json")]
    pub json: bool,

    /// Print the bundled default config file and exit.
    #[arg(long = "print-config")]
    pub print_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.api.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(dir) = &self.documents {
            config.tools.documents_dir = Some(dir.clone());
        }
        if self.no_reasoning {
            config.agent.require_reasoning = false;
        }
    }
}
