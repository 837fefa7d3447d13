//! `coursebot serve` — Start the LINE webhook server.

use coursebot_config::AppConfig;

pub async fn run(port_override: Option<u16>, no_announce: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if no_announce {
        config.startup.announce = false;
    }

    // Fail before binding anything if LINE is not set up
    if let Err(e) = config.require_line_credentials() {
        eprintln!();
        eprintln!("  ERROR: {e}");
        eprintln!();
        eprintln!("  Set them in the environment or in a .env file:");
        eprintln!("    {}=...", coursebot_config::ENV_ACCESS_TOKEN);
        eprintln!("    {}=...", coursebot_config::ENV_CHANNEL_SECRET);
        eprintln!();
        return Err(e.into());
    }

    println!("🤖 coursebot");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Webhook:   {}", config.gateway.webhook_url);
    println!("   Model:     {} @ {}", config.ollama.model, config.ollama.base_url);

    coursebot_gateway::start(config).await?;

    Ok(())
}
