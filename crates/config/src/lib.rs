//! Configuration loading, validation, and management for coursebot.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. an optional TOML file (`$COURSEBOT_CONFIG`, else `./coursebot.toml`)
//! 3. environment variables, including those read from a `.env` file
//!
//! LINE credentials are only required by the webhook server; see
//! [`AppConfig::require_line_credentials`].

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_MODEL: &str = "OLLAMA_MODEL";
pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_STARTUP_TARGET: &str = "LINE_STARTUP_TARGET";
pub const ENV_CONFIG_PATH: &str = "COURSEBOT_CONFIG";

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LINE Messaging API settings
    #[serde(default)]
    pub line: LineConfig,

    /// Language-model settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// HTTP server settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Prompt and memory settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Startup announcement settings
    #[serde(default)]
    pub startup: StartupConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_secret: Option<String>,

    #[serde(default = "default_line_api_base")]
    pub api_base: String,

    /// User ID that receives the startup message. None = broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_target: Option<String>,
}

fn default_line_api_base() -> String {
    "https://api.line.me".into()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: default_line_api_base(),
            startup_target: None,
        }
    }
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_access_token", &redact(&self.channel_access_token))
            .field("channel_secret", &redact(&self.channel_secret))
            .field("api_base", &self.api_base)
            .field("startup_target", &self.startup_target)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Sampling temperature. None = the model's own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    "llama2:13b-chat".into()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_ollama_url(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public callback URL registered with LINE (informational).
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_webhook_url() -> String {
    "http://localhost:5000/webhook".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_url: default_webhook_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Replace the built-in system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Replace the built-in assistant preamble (announcements).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,

    /// Maximum remembered exchanges in memory mode.
    #[serde(default = "default_max_exchanges")]
    pub max_exchanges: usize,

    /// Whether interactive chat starts in memory mode.
    #[serde(default = "default_true")]
    pub memory_enabled: bool,
}

fn default_max_exchanges() -> usize {
    5
}
fn default_true() -> bool {
    true
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            preamble: None,
            max_exchanges: default_max_exchanges(),
            memory_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Send a message through LINE when the server starts.
    #[serde(default = "default_true")]
    pub announce: bool,

    /// IANA timezone used to stamp the startup message.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Asia/Taipei".into()
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            announce: true,
            timezone: default_timezone(),
        }
    }
}

impl StartupConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::ValidationError(format!("invalid timezone '{}': {e}", self.timezone)))
    }
}

/// LINE credentials, present and non-empty.
#[derive(Clone)]
pub struct LineCredentials {
    pub access_token: String,
    pub channel_secret: String,
}

impl std::fmt::Debug for LineCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineCredentials")
            .field("access_token", &"[REDACTED]")
            .field("channel_secret", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration: `.env`, then the config file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        let path = Self::config_path();
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// The config file location.
    pub fn config_path() -> PathBuf {
        std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("coursebot.toml"))
    }

    /// Apply environment overrides. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.line.channel_access_token = Some(token);
        }
        if let Some(secret) = get(ENV_CHANNEL_SECRET) {
            self.line.channel_secret = Some(secret);
        }
        if let Some(target) = get(ENV_STARTUP_TARGET) {
            self.line.startup_target = Some(target);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.ollama.model = model;
        }
        if let Some(host) = get(ENV_OLLAMA_HOST) {
            self.ollama.base_url = host;
        }
        if let Some(url) = get(ENV_WEBHOOK_URL) {
            self.gateway.webhook_url = url;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.ollama.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "ollama.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.assistant.max_exchanges == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.max_exchanges must be at least 1".into(),
            ));
        }

        self.startup.tz()?;
        Ok(())
    }

    /// Return the LINE credentials, or one error listing every missing value.
    pub fn require_line_credentials(&self) -> Result<LineCredentials, ConfigError> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        let token = non_empty(&self.line.channel_access_token);
        let secret = non_empty(&self.line.channel_secret);

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push(ENV_ACCESS_TOKEN.to_string());
        }
        if secret.is_none() {
            missing.push(ENV_CHANNEL_SECRET.to_string());
        }

        match (token, secret) {
            (Some(access_token), Some(channel_secret)) => Ok(LineCredentials {
                access_token,
                channel_secret,
            }),
            _ => Err(ConfigError::MissingCredentials(missing)),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {}", .0.iter().map(|k| format!("{k} is not set")).collect::<Vec<_>>().join("; "))]
    MissingCredentials(Vec<String>),
}
