//! The course assistant: fixed prompts around a model call.

use std::sync::Arc;

use coursebot_core::error::ProviderError;
use coursebot_core::message::Message;
use coursebot_core::provider::{Provider, ProviderRequest};
use tracing::{debug, error};

use crate::prompts::{ASSISTANT_PREAMBLE, SYSTEM_PROMPT, error_reply};
use crate::reasoning::strip_reasoning_trace;

/// Sends role-tagged prompts to the configured model and cleans its replies.
pub struct CourseAssistant {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: Option<f32>,
    system: Message,
    preamble: Message,
}

impl CourseAssistant {
    /// Create an assistant with the built-in course prompts.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            system: Message::system(SYSTEM_PROMPT),
            preamble: Message::assistant(ASSISTANT_PREAMBLE),
        }
    }

    /// Create an assistant from the `ollama` and `assistant` config sections.
    pub fn from_config(provider: Arc<dyn Provider>, config: &coursebot_config::AppConfig) -> Self {
        let mut assistant = Self::new(provider, &config.ollama.model);
        if let Some(t) = config.ollama.temperature {
            assistant = assistant.with_temperature(t);
        }
        if let Some(prompt) = &config.assistant.system_prompt {
            assistant = assistant.with_system_prompt(prompt);
        }
        if let Some(preamble) = &config.assistant.preamble {
            assistant = assistant.with_preamble(preamble);
        }
        assistant
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system = Message::system(prompt);
        self
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Message::assistant(preamble);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn system_message(&self) -> &Message {
        &self.system
    }

    pub fn preamble_message(&self) -> &Message {
        &self.preamble
    }

    /// `[system, preamble, user]`, the prompt for a question with no history.
    pub fn single_turn(&self, user_text: &str) -> Vec<Message> {
        vec![
            self.system.clone(),
            self.preamble.clone(),
            Message::user(user_text),
        ]
    }

    /// Send `messages` to the model and return the reply without its reasoning trace.
    pub async fn respond(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        let mut request = ProviderRequest::new(&self.model, messages);
        if let Some(t) = self.temperature {
            request = request.with_temperature(t);
        }

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model replied"
            );
        }

        Ok(strip_reasoning_trace(response.message.content()).trim().to_string())
    }

    /// Answer one standalone question. Failures become the reply text.
    pub async fn answer(&self, user_text: &str) -> String {
        match self.respond(self.single_turn(user_text)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, model = %self.model, "Model call failed");
                error_reply(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use coursebot_core::message::Role;

    #[tokio::test]
    async fn answer_sends_system_preamble_user() {
        let provider = Arc::new(ScriptedProvider::replies(&["期中考在 4/23"]));
        let assistant = CourseAssistant::new(provider.clone(), "llama2:13b-chat");

        let reply = assistant.answer("有什麼公告").await;
        assert_eq!(reply, "期中考在 4/23");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "llama2:13b-chat");
        let roles: Vec<Role> = requests[0].messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(requests[0].messages[0].content(), SYSTEM_PROMPT);
        assert_eq!(requests[0].messages[1].content(), ASSISTANT_PREAMBLE);
        assert_eq!(requests[0].messages[2].content(), "有什麼公告");
    }

    #[tokio::test]
    async fn respond_strips_reasoning_trace() {
        let provider = Arc::new(ScriptedProvider::replies(&[
            "<think>\n這是要程式碼\n</think>\n\n我無法提供作業解答",
        ]));
        let assistant = CourseAssistant::new(provider, "deepseek-r1");

        let reply = assistant.respond(assistant.single_turn("幫我寫")).await.unwrap();
        assert_eq!(reply, "我無法提供作業解答");
    }

    #[tokio::test]
    async fn answer_converts_failure_to_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Network(
            "connection refused".into(),
        ))]));
        let assistant = CourseAssistant::new(provider, "m");

        let reply = assistant.answer("hi").await;
        assert!(reply.starts_with("生成回應時發生錯誤: "));
        assert!(reply.contains("connection refused"));
    }

    #[tokio::test]
    async fn config_overrides_apply() {
        let mut config = coursebot_config::AppConfig::default();
        config.ollama.model = "qwen:7b-chat".into();
        config.ollama.temperature = Some(0.2);
        config.assistant.system_prompt = Some("custom system".into());
        config.assistant.preamble = Some("custom preamble".into());

        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let assistant = CourseAssistant::from_config(provider.clone(), &config);
        assert_eq!(assistant.model(), "qwen:7b-chat");

        assistant.answer("q").await;
        let request = &provider.requests()[0];
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.messages[0].content(), "custom system");
        assert_eq!(request.messages[1].content(), "custom preamble");
    }
}
