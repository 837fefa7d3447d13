//! coursebot CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the LINE webhook server
//! - `chat`    — Interactive chat with optional memory, or single-message mode
//! - `probe`   — Check that the assistant refuses code/implementation requests
//! - `course`  — Show the course-information store
//! - `doctor`  — Diagnose configuration and Ollama connectivity

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coursebot",
    about = "coursebot — machine-vision course assistant for LINE",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the LINE webhook server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Skip the startup announcement
        #[arg(long)]
        no_announce: bool,
    },

    /// Chat with the course assistant in the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Start with memory mode off
        #[arg(long)]
        no_memory: bool,
    },

    /// Ask canned questions and report which ones were refused
    Probe {
        /// Question to ask (repeatable); replaces the built-in list
        #[arg(short, long = "prompt")]
        prompts: Vec<String>,
    },

    /// Show the course announcements, assignments and topics
    Course {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and Ollama connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port, no_announce } => commands::serve::run(port, no_announce).await?,
        Commands::Chat { message, no_memory } => commands::chat::run(message, no_memory).await?,
        Commands::Probe { prompts } => commands::probe::run(prompts).await?,
        Commands::Course { json } => commands::course::run(json)?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
