//! CLI entry point for neat.

mod cli;

use clap::Parser;
use futures::StreamExt;
use neat_agent::agent::{Agent, AgentEvent};
use neat_agent::config::{load_config, DEFAULT_CONFIG_TEMPLATE};
use neat_agent::error::AgentError;
use neat_agent::setup::build_agent;
use std::io::{BufRead, IsTerminal, Write};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    if args.print_config {
        println!("{DEFAULT_CONFIG_TEMPLATE}");
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let mut config = loaded.config;
    args.apply(&mut config);
    if config.api.api_key.is_empty() {
        tracing::warn!("no API key configured; set NEAT_API_KEY or api.api_key_env");
    }

    let agent = match build_agent(&config) {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(prompt) = args.prompt.as_deref() {
        if let Err(e) = answer(&agent, prompt, args.json).await {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let interactive = std::io::stdin().is_terminal();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            eprint!("> ");
            let _ = std::io::stderr().flush();
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: failed to read stdin: {e}");
                std::process::exit(1);
            }
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        // A failed reply ends that query only; the session continues.
        if let Err(e) = answer(&agent, query, args.json).await {
            eprintln!("error: {e}");
        }
    }

    let usage = agent.usage();
    tracing::info!(
        requests = usage.requests,
        total_tokens = usage.session_total(),
        "session finished"
    );
}

async fn answer(agent: &Agent, query: &str, json: bool) -> Result<(), AgentError> {
    let stream = agent.reply_to(query);
    futures::pin_mut!(stream);
    while let Some(event) = stream.next().await {
        let event = event?;
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to encode event"),
            }
            continue;
        }
        match &event {
            AgentEvent::Thought { text } => {
                eprintln!("thought: {}", text.as_deref().unwrap_or("(none given)"));
            }
            AgentEvent::FunctionCall { text } => eprintln!("tool: {text}"),
            AgentEvent::Answer { text } => println!("{text}"),
        }
    }
    Ok(())
}
