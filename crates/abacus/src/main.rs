//! A scripted conversation with the math agent.
//!
//! Spawns the two provider servers, connects the registry and walks
//! through a few queries, threading the conversation between them.

#[macro_use]
extern crate tracing;

use std::env;
use std::path::PathBuf;

use abacus_core::{Controller, ControllerBuilder, Conversation, Registry};
use abacus_model::ModelMessage;
use abacus_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use abacus_rpc::{ProviderClient, ProviderConfig};
use owo_colors::OwoColorize;

const SYSTEM_PROMPT: &str = "You are a helpful math assistant. Use the \
    available tools for any arithmetic instead of computing it yourself, \
    and state the final answer plainly.";

const QUERIES: &[&str] = &[
    "What's (3 + 5) x 12?",
    "Now I want to get the square of that result",
    "What's 2^8 + 15?",
];

/// Directory holding the provider server executables.
///
/// Defaults to the directory this binary runs from, which is where
/// Cargo places every workspace binary. `ABACUS_PROVIDER_DIR`
/// overrides it.
fn provider_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var("ABACUS_PROVIDER_DIR") {
        return Some(dir.into());
    }
    let exe = env::current_exe().ok()?;
    Some(exe.parent()?.to_path_buf())
}

fn provider_config(dir: &std::path::Path, name: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_owned(),
        command: dir.join(format!("{name}{}", env::consts::EXE_SUFFIX)),
        args: Vec::new(),
    }
}

fn print_turn(conversation: &Conversation, from: usize) {
    for message in &conversation.messages()[from..] {
        match message {
            ModelMessage::System { .. } => {}
            ModelMessage::User { content } => {
                println!("{} {content}", "You:".bold().cyan());
            }
            ModelMessage::Assistant {
                content,
                tool_calls,
            } => {
                for call in tool_calls {
                    println!(
                        "{} {}({})",
                        "Tool call:".bold().yellow(),
                        call.name,
                        call.arguments
                    );
                }
                if let Some(content) = content {
                    if !content.is_empty() {
                        println!("{} {content}", "Agent:".bold().green());
                    }
                }
            }
            ModelMessage::Tool(result) => {
                println!("{} {}", "Tool result:".bold().yellow(), result.content);
            }
        }
    }
}

async fn run_queries(controller: &Controller) {
    let mut conversation: Option<Conversation> = None;
    for query in QUERIES {
        let prior_len =
            conversation.as_ref().map(Conversation::len).unwrap_or(0);
        match controller.process_query(query, conversation.take()).await {
            Ok(next) => {
                print_turn(&next, prior_len);
                conversation = Some(next);
            }
            Err(err) => {
                eprintln!("query failed: {err}");
                return;
            }
        }
        println!();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = env::var("OPENAI_API_KEY") else {
        eprintln!("OPENAI_API_KEY environment variable is not set");
        return;
    };
    let Ok(base_url) = env::var("OPENAI_BASE_URL") else {
        eprintln!("OPENAI_BASE_URL environment variable is not set");
        return;
    };
    let Ok(model) = env::var("OPENAI_MODEL") else {
        eprintln!("OPENAI_MODEL environment variable is not set");
        return;
    };

    let Some(provider_dir) = provider_dir() else {
        eprintln!("could not locate the provider server executables");
        return;
    };

    let mut providers: Vec<Box<dyn abacus_core::tool::ToolProvider>> =
        Vec::new();
    for name in ["elementary-math-server", "exponent-math-server"] {
        let config = provider_config(&provider_dir, name);
        match ProviderClient::spawn(&config) {
            Ok(client) => providers.push(Box::new(client)),
            Err(err) => {
                eprintln!("{err}");
                return;
            }
        }
    }

    let registry = match Registry::connect(providers).await {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    info!(
        "registry ready with {} operation(s)",
        registry.definitions().len()
    );

    let config = OpenAIConfigBuilder::with_api_key(api_key)
        .with_base_url(base_url)
        .with_model(model)
        .build();
    let controller = ControllerBuilder::with_model_provider(
        OpenAIProvider::new(config),
    )
    .with_registry(registry)
    .with_system_prompt(SYSTEM_PROMPT)
    .build();

    run_queries(&controller).await;
}
