//! LLM provider implementations for coursebot.
//!
//! All providers implement the `coursebot_core::Provider` trait.

pub mod ollama;

pub use ollama::OllamaProvider;

/// Build the configured provider.
pub fn build_from_config(config: &coursebot_config::AppConfig) -> OllamaProvider {
    OllamaProvider::new(&config.ollama.base_url)
}
