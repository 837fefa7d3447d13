//! Ollama provider implementation.
//!
//! Talks to a locally hosted Ollama server through its native chat API:
//!
//! - `POST /api/chat` — non-streaming chat completion
//! - `GET  /api/tags` — installed models (listing and health checks)

use async_trait::async_trait;
use coursebot_core::error::ProviderError;
use coursebot_core::message::{Message, Role};
use coursebot_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// A provider backed by a local Ollama server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the JSON body for `/api/chat`.
    fn chat_body(request: &ProviderRequest) -> ChatRequest<'_> {
        ChatRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role().as_str(),
                    content: m.content(),
                })
                .collect(),
            stream: false,
            options: request.temperature.map(|temperature| ChatOptions { temperature }),
        }
    }
}

/// Ollama's `{"error": ...}` text, or the raw body when it is not JSON.
async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}

fn map_reqwest_err(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = Self::chat_body(&request);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_err)?;

        let status = response.status().as_u16();

        if status != 200 {
            let message = error_message(response).await;
            warn!(status, error = %message, "Ollama returned error");
            if status == 404 {
                return Err(ProviderError::ModelNotFound(message));
            }
            return Err(ProviderError::ApiError {
                status_code: status,
                message,
            });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        let message = api_response
            .message
            .ok_or_else(|| ProviderError::MalformedResponse("No message in response".into()))?;

        let usage = match (api_response.prompt_eval_count, api_response.eval_count) {
            (Some(prompt), Some(completion)) => Some(Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt.saturating_add(completion),
            }),
            _ => None,
        };

        Ok(ProviderResponse {
            message: Message::new(Role::Assistant, message.content),
            usage,
            model: api_response.model.unwrap_or(request.model),
        })
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_err)?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = error_message(response).await;
            warn!(status = status_code, error = %message, "Ollama model listing failed");
            return Err(ProviderError::ApiError {
                status_code,
                message,
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_err)?;

        Ok(response.status().is_success())
    }
}

// --- Ollama API wire types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}
