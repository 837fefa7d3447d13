//! `coursebot chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use coursebot_agent::{ChatSession, ConversationMemory, CourseAssistant, SessionCommand};
use coursebot_channels::CliChannel;
use coursebot_config::{AppConfig, AssistantConfig};
use coursebot_core::channel::Channel;

pub async fn run(message: Option<String>, no_memory: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider = Arc::new(coursebot_providers::build_from_config(&config));
    let assistant = Arc::new(CourseAssistant::from_config(provider, &config));

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = assistant.answer(&msg).await;
        eprint!("\r              \r");
        println!("{reply}");
        return Ok(());
    }

    let mut session = ChatSession::new(assistant, initial_memory(&config.assistant, no_memory));

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      coursebot — Interactive Course Chat      ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.ollama.model);
    println!("  Ollama:    {}", config.ollama.base_url);
    println!(
        "  Memory:    {} (last {} exchanges)",
        if session.memory().is_enabled() { "on" } else { "off" },
        session.memory().max_exchanges()
    );
    println!();
    println!("  Commands:  /memory on, /memory off, /history");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let channel = CliChannel::new();
    let mut rx = channel.start();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(incoming) => {
                if let Some(command) = SessionCommand::parse(&incoming.text) {
                    println!("  {}", session.execute(command));
                } else {
                    eprint!("  ...");
                    let reply = session.send(&incoming.text).await;
                    eprint!("\r     \r");
                    println!();
                    channel.reply(&incoming.reply_token, &reply).await?;
                }
                println!();

                print!("  You > ");
                std::io::stdout().flush()?;
            }
            Err(e) => {
                eprintln!("  [Channel Error] {e}");
                break;
            }
        }
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Memory for a new session; `--no-memory` starts it disabled.
fn initial_memory(config: &AssistantConfig, no_memory: bool) -> ConversationMemory {
    ConversationMemory::new(config.max_exchanges, config.memory_enabled && !no_memory)
}
