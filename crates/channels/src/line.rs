//! LINE Messaging API channel adapter.
//!
//! Inbound: LINE POSTs webhook events signed with the channel secret
//! (`X-Line-Signature` = base64 HMAC-SHA256 of the raw body).
//! Outbound: reply / push / broadcast calls authenticated with the
//! channel access token.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use coursebot_core::channel::{Channel, ChannelId, IncomingMessage};
use coursebot_core::error::ChannelError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

/// LINE rejects text messages longer than this many characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Verifies (and, for tests and tooling, produces) webhook signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    channel_secret: String,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("channel_secret", &"[REDACTED]")
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
        }
    }

    /// Compute the base64 signature of a payload.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.channel_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Check a payload against its `X-Line-Signature` value.
    ///
    /// Uses constant-time comparison via `verify_slice`.
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let provided = match BASE64.decode(signature.trim()) {
            Ok(b) => b,
            Err(_) => return false,
        };

        let mut mac = match HmacSha256::new_from_slice(self.channel_secret.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(body);
        mac.verify_slice(&provided).is_ok()
    }

    /// Like [`verify`](Self::verify), as a `Result` for request handlers.
    pub fn check(&self, body: &[u8], signature: &str) -> Result<(), ChannelError> {
        if self.verify(body, signature) {
            Ok(())
        } else {
            Err(ChannelError::InvalidSignature)
        }
    }
}

// --- Webhook payload ---

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "replyToken", default)]
    reply_token: Option<String>,
    #[serde(default)]
    source: Option<EventSource>,
    #[serde(default)]
    message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
struct EventSource {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Extract the text-message events from a webhook body.
///
/// Events of other types (follow, postback, sticker messages, ...) are skipped.
pub fn parse_events(body: &[u8]) -> Result<Vec<IncomingMessage>, ChannelError> {
    let payload: WebhookPayload = serde_json::from_slice(body)
        .map_err(|e| ChannelError::InvalidPayload(e.to_string()))?;

    let messages = payload
        .events
        .into_iter()
        .filter_map(|event| {
            if event.kind != "message" {
                debug!(kind = %event.kind, "Skipping non-message event");
                return None;
            }
            let message = event.message?;
            if message.kind != "text" {
                debug!(kind = %message.kind, "Skipping non-text message");
                return None;
            }
            Some(IncomingMessage {
                channel_id: ChannelId("line".into()),
                sender_id: event.source.and_then(|s| s.user_id),
                reply_token: event.reply_token?,
                text: message.text?,
            })
        })
        .collect();

    Ok(messages)
}

// --- Outbound ---

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

fn text_messages(content: &str) -> Vec<TextMessage<'_>> {
    vec![TextMessage {
        kind: "text",
        text: truncate_text(content),
    }]
}

/// Cut text to LINE's limit on a char boundary.
pub fn truncate_text(content: &str) -> &str {
    match content.char_indices().nth(MAX_TEXT_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// LINE channel configuration.
#[derive(Clone)]
pub struct LineConfig {
    /// Channel access token (bearer credential for the Messaging API).
    pub access_token: String,
    /// API origin, e.g. `https://api.line.me`.
    pub api_base: String,
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("access_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// LINE channel adapter.
pub struct LineChannel {
    config: LineConfig,
    channel_id: ChannelId,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(config: LineConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config: LineConfig {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
            channel_id: ChannelId("line".into()),
            client,
        }
    }

    pub fn id(&self) -> &ChannelId {
        &self.channel_id
    }

    async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<(), ChannelError> {
        let url = format!("{}/v2/bot/message/{endpoint}", self.config.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: "line".into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), body = %error_body, "LINE API rejected message");
            return Err(ChannelError::DeliveryFailed {
                channel: "line".into(),
                reason: format!("{endpoint} returned {}: {error_body}", status.as_u16()),
            });
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct ReplyRequest<'a> {
    #[serde(rename = "replyToken")]
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    messages: Vec<TextMessage<'a>>,
}

#[async_trait]
impl Channel for LineChannel {
    fn name(&self) -> &str {
        "line"
    }

    async fn reply(&self, reply_token: &str, content: &str) -> Result<(), ChannelError> {
        self.post(
            "reply",
            &ReplyRequest {
                reply_token,
                messages: text_messages(content),
            },
        )
        .await?;
        info!(content_len = content.len(), "LINE reply sent");
        Ok(())
    }

    async fn push(&self, to: &str, content: &str) -> Result<(), ChannelError> {
        self.post(
            "push",
            &PushRequest {
                to,
                messages: text_messages(content),
            },
        )
        .await?;
        info!(to = %to, "LINE push sent");
        Ok(())
    }

    async fn broadcast(&self, content: &str) -> Result<(), ChannelError> {
        self.post(
            "broadcast",
            &BroadcastRequest {
                messages: text_messages(content),
            },
        )
        .await?;
        info!("LINE broadcast sent");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(!self.config.access_token.is_empty())
    }
}
