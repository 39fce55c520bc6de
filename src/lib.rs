//! Neat: a tool-using question-answering agent for OpenAI-compatible APIs.
//!
//! Each query runs a loop in which the model either calls one of the
//! registered tools (web search, page retrieval, weather, document search,
//! conversation history, content writing) or answers. Tool results are fed
//! back on the next turn until an answer is reached.
//!
//! # Quick start
//!
//! ```no_run
//! use neat_agent::config::load_config;
//! use neat_agent::setup::build_agent;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?.config;
//! let agent = build_agent(&config)?;
//! let answer = agent.reply("What's the weather like in Lisbon tomorrow?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod prompt;
pub mod setup;
#[cfg(test)]
pub mod testsupport;
pub mod tokens;
pub mod tools;
pub mod types;
