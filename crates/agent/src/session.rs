//! Interactive chat session: one user, optional memory.

use std::sync::Arc;

use tracing::{error, info};

use crate::assistant::CourseAssistant;
use crate::history::ConversationMemory;
use crate::prompts::error_reply;

/// In-chat commands understood by [`ChatSession::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    MemoryOn,
    MemoryOff,
    History,
}

impl SessionCommand {
    /// Recognize a command line; anything else is a question for the model.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match (words.next()?, words.next(), words.next()) {
            ("/memory", Some("on"), None) => Self::MemoryOn,
            ("/memory", Some("off"), None) => Self::MemoryOff,
            ("/history", None, None) => Self::History,
            _ => return None,
        };
        Some(command)
    }
}

pub struct ChatSession {
    assistant: Arc<CourseAssistant>,
    memory: ConversationMemory,
}

impl ChatSession {
    pub fn new(assistant: Arc<CourseAssistant>, memory: ConversationMemory) -> Self {
        Self { assistant, memory }
    }

    pub fn assistant(&self) -> &CourseAssistant {
        &self.assistant
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Ask the model, remembering the exchange if memory mode is on.
    ///
    /// A failed call returns the error text and leaves memory untouched.
    pub async fn send(&mut self, user_text: &str) -> String {
        let prompt = self.memory.build_prompt(
            self.assistant.system_message(),
            self.assistant.preamble_message(),
            user_text,
        );

        match self.assistant.respond(prompt).await {
            Ok(reply) => {
                self.memory.record_turn(user_text, &reply);
                reply
            }
            Err(e) => {
                error!(error = %e, "Model call failed");
                error_reply(&e)
            }
        }
    }

    /// Run an in-chat command and return the line to show the user.
    pub fn execute(&mut self, command: SessionCommand) -> String {
        match command {
            SessionCommand::MemoryOn => {
                self.memory.toggle_on();
                info!(max_exchanges = self.memory.max_exchanges(), "Memory mode enabled");
                format!(
                    "memory mode enabled (keeping the last {} exchanges)",
                    self.memory.max_exchanges()
                )
            }
            SessionCommand::MemoryOff => match self.memory.toggle_off() {
                Ok(()) => {
                    info!("Memory mode disabled");
                    "memory mode disabled".to_string()
                }
                Err(e) => e.to_string(),
            },
            SessionCommand::History => {
                let mode = if self.memory.is_enabled() { "on" } else { "off" };
                format!(
                    "{} messages retained (memory {mode}, capacity {})",
                    self.memory.len(),
                    self.memory.capacity()
                )
            }
        }
    }
}
