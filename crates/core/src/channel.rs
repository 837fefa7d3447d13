//! Channel trait — the abstraction over message delivery.
//!
//! A Channel connects the bot to a place where students read replies
//! (the LINE Messaging API, or the terminal). Inbound messages arrive
//! through the webhook or stdin and are represented as [`IncomingMessage`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text message received from a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// The channel this message came from
    pub channel_id: ChannelId,

    /// Sender identifier (platform user ID), when the platform provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,

    /// Token used to answer this specific message
    pub reply_token: String,

    /// The text content
    pub text: String,
}

/// The core Channel trait.
///
/// Delivery failures are reported to the caller, which logs them; channels
/// never retry on their own.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "line", "cli").
    fn name(&self) -> &str;

    /// Answer a received message identified by its reply token.
    async fn reply(&self, reply_token: &str, content: &str) -> std::result::Result<(), ChannelError>;

    /// Send an unsolicited message to one recipient.
    async fn push(&self, to: &str, content: &str) -> std::result::Result<(), ChannelError>;

    /// Send a message to every follower of the bot.
    async fn broadcast(&self, content: &str) -> std::result::Result<(), ChannelError>;

    /// Health check — is the channel usable?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}
