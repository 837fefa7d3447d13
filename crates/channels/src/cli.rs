//! CLI channel — interactive terminal chat.
//!
//! Reads lines from stdin, writes replies to stdout.
//! Used for `coursebot chat` interactive mode.

use async_trait::async_trait;
use coursebot_core::channel::{Channel, ChannelId, IncomingMessage};
use coursebot_core::error::ChannelError;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Whether a line ends the interactive session.
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit" | "/exit" | "/quit" | ":q")
}

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            id: ChannelId("cli".into()),
        }
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// Start reading stdin. The receiver closes on EOF or an exit command.
    pub fn start(&self) -> mpsc::Receiver<Result<IncomingMessage, ChannelError>> {
        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();

        tokio::spawn(async move {
            let reader = BufReader::new(io::stdin());
            let mut lines = reader.lines();
            let mut seq: u64 = 0;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        if is_exit_command(&line) {
                            break;
                        }

                        seq += 1;
                        let msg = IncomingMessage {
                            channel_id: channel_id.clone(),
                            sender_id: Some("local_user".into()),
                            reply_token: format!("cli-{seq}"),
                            text: line,
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx
                            .send(Err(ChannelError::ConnectionLost(e.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });

        rx
    }
}

/// Prefix every line of a reply for the terminal.
pub fn format_reply(content: &str) -> String {
    content
        .lines()
        .map(|line| format!("  Assistant > {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn reply(&self, _reply_token: &str, content: &str) -> Result<(), ChannelError> {
        println!("{}", format_reply(content));
        Ok(())
    }

    async fn push(&self, _to: &str, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }

    async fn broadcast(&self, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }
}
