//! Bounded conversation memory for the interactive chat.
//!
//! History only ever holds completed exchanges: one user message followed by
//! the assistant's reply. Capacity is `2 × max_exchanges` messages; when a new
//! exchange would exceed it, the oldest exchanges are dropped whole, so the
//! buffer never splits a user message from its reply.

use std::collections::VecDeque;

use coursebot_core::message::Message;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryModeError {
    #[error("memory mode is not enabled")]
    NotEnabled,
}

/// Retained user/assistant exchanges plus the on/off switch.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    history: VecDeque<Message>,
    max_exchanges: usize,
    enabled: bool,
}

impl ConversationMemory {
    /// A memory keeping at most `max_exchanges` exchanges (minimum 1).
    pub fn new(max_exchanges: usize, enabled: bool) -> Self {
        let max_exchanges = max_exchanges.max(1);
        Self {
            history: VecDeque::with_capacity(max_exchanges * 2),
            max_exchanges,
            enabled,
        }
    }

    pub fn from_config(config: &coursebot_config::AssistantConfig) -> Self {
        Self::new(config.max_exchanges, config.memory_enabled)
    }

    /// Enable memory mode, starting from an empty history.
    pub fn toggle_on(&mut self) {
        self.history.clear();
        self.enabled = true;
    }

    /// Disable memory mode. Fails if it is already off.
    pub fn toggle_off(&mut self) -> Result<(), MemoryModeError> {
        if !self.enabled {
            return Err(MemoryModeError::NotEnabled);
        }
        self.enabled = false;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_exchanges(&self) -> usize {
        self.max_exchanges
    }

    /// Maximum number of retained messages.
    pub fn capacity(&self) -> usize {
        self.max_exchanges * 2
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Retained messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.history.iter()
    }

    /// Store a completed exchange. No-op while memory mode is off.
    pub fn record_turn(&mut self, user_text: &str, assistant_text: &str) {
        if !self.enabled {
            return;
        }

        let mut dropped = 0;
        while self.history.len() + 2 > self.capacity() {
            self.history.pop_front();
            self.history.pop_front();
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "Dropped oldest exchanges from memory");
        }

        self.history.push_back(Message::user(user_text));
        self.history.push_back(Message::assistant(assistant_text));
    }

    /// Assemble the message list for the next model call.
    ///
    /// `[system, preamble] + history + [user]` with memory on,
    /// exactly `[system, preamble, user]` with memory off.
    pub fn build_prompt(&self, system: &Message, preamble: &Message, user_text: &str) -> Vec<Message> {
        let retained = if self.enabled { self.history.len() } else { 0 };
        let mut messages = Vec::with_capacity(retained + 3);
        messages.push(system.clone());
        messages.push(preamble.clone());
        if self.enabled {
            messages.extend(self.history.iter().cloned());
        }
        messages.push(Message::user(user_text));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursebot_core::message::Role;

    fn system() -> Message {
        Message::system("sys")
    }

    fn preamble() -> Message {
        Message::assistant("preamble")
    }

    fn fill(memory: &mut ConversationMemory, exchanges: usize) {
        for i in 1..=exchanges {
            memory.record_turn(&format!("q{i}"), &format!("a{i}"));
        }
    }

    #[test]
    fn keeps_most_recent_exchanges() {
        let mut memory = ConversationMemory::new(3, true);
        fill(&mut memory, 4);

        let contents: Vec<&str> = memory.messages().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["q2", "a2", "q3", "a3", "q4", "a4"]);
    }

    #[test]
    fn length_settles_at_capacity() {
        for n in 1..=6 {
            let mut memory = ConversationMemory::new(n, true);
            fill(&mut memory, n + 1);
            assert_eq!(memory.len(), 2 * n);
            fill(&mut memory, 3 * n);
            assert_eq!(memory.len(), 2 * n);
        }
    }

    #[test]
    fn roles_alternate_starting_with_user() {
        let mut memory = ConversationMemory::new(2, true);
        fill(&mut memory, 5);
        for (i, msg) in memory.messages().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(msg.role(), expected);
        }
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let memory = ConversationMemory::new(0, true);
        assert_eq!(memory.max_exchanges(), 1);
    }

    #[test]
    fn prompt_with_memory_includes_history() {
        let mut memory = ConversationMemory::new(5, true);
        fill(&mut memory, 2);

        let prompt = memory.build_prompt(&system(), &preamble(), "q3");
        assert_eq!(prompt.len(), 7);
        assert_eq!(prompt[0].role(), Role::System);
        assert_eq!(prompt[1].role(), Role::Assistant);
        assert_eq!(prompt[2].content(), "q1");
        assert_eq!(prompt[6], Message::user("q3"));
    }

    #[test]
    fn prompt_without_memory_is_three_messages() {
        let mut memory = ConversationMemory::new(5, true);
        fill(&mut memory, 3);
        memory.toggle_off().unwrap();

        let prompt = memory.build_prompt(&system(), &preamble(), "next");
        assert_eq!(prompt.len(), 3);
        assert_eq!(prompt[2].content(), "next");

        fill(&mut memory, 4);
        assert_eq!(memory.build_prompt(&system(), &preamble(), "again").len(), 3);
    }

    #[test]
    fn disabled_memory_records_nothing() {
        let mut memory = ConversationMemory::new(5, false);
        fill(&mut memory, 2);
        assert!(memory.is_empty());
    }

    #[test]
    fn toggle_on_clears_history() {
        let mut memory = ConversationMemory::new(5, true);
        fill(&mut memory, 2);
        memory.toggle_off().unwrap();
        memory.toggle_on();
        assert!(memory.is_enabled());
        assert!(memory.is_empty());
    }

    #[test]
    fn toggle_on_while_on_also_clears() {
        let mut memory = ConversationMemory::new(5, true);
        fill(&mut memory, 1);
        memory.toggle_on();
        assert!(memory.is_empty());
    }

    #[test]
    fn toggle_off_twice_fails() {
        let mut memory = ConversationMemory::new(5, true);
        assert!(memory.toggle_off().is_ok());
        let err = memory.toggle_off().unwrap_err();
        assert_eq!(err, MemoryModeError::NotEnabled);
        assert_eq!(err.to_string(), "memory mode is not enabled");
    }
}
