//! Chat channel implementations for coursebot.
//!
//! Each channel delivers the assistant's replies somewhere a student can
//! read them.
//!
//! Available channels:
//! - **LINE** — LINE Messaging API (signed webhooks in, reply/push/broadcast out)
//! - **CLI** — Interactive terminal chat (stdin/stdout)

pub mod cli;
pub mod line;

pub use cli::CliChannel;
pub use line::{LineChannel, LineConfig, SignatureVerifier};

/// Build the LINE channel and signature verifier from application config.
pub fn line_from_config(
    config: &coursebot_config::AppConfig,
) -> Result<(LineChannel, SignatureVerifier), coursebot_config::ConfigError> {
    let credentials = config.require_line_credentials()?;
    let channel = LineChannel::new(LineConfig {
        access_token: credentials.access_token,
        api_base: config.line.api_base.clone(),
    });
    Ok((channel, SignatureVerifier::new(credentials.channel_secret)))
}
