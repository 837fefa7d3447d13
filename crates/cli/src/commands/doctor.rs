//! `coursebot doctor` — Diagnose configuration and Ollama connectivity.

use coursebot_config::AppConfig;
use coursebot_core::provider::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 coursebot Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    // Check config
    let config = match AppConfig::load() {
        Ok(config) => {
            let path = AppConfig::config_path();
            if path.exists() {
                println!("  ✅ Config file valid ({})", path.display());
            } else {
                println!("  ✅ Config loaded from defaults and environment");
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!();
            println!("  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    // Check LINE credentials
    match config.require_line_credentials() {
        Ok(_) => println!("  ✅ LINE credentials configured"),
        Err(e) => {
            println!("  ⚠️  {e} — `coursebot serve` will refuse to start");
            issues += 1;
        }
    }

    // Check Ollama
    let provider = coursebot_providers::build_from_config(&config);
    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Ollama reachable at {}", provider.base_url());

            match provider.list_models().await {
                Ok(models) if model_installed(&models, &config.ollama.model) => {
                    println!("  ✅ Model {} installed", config.ollama.model);
                }
                Ok(_) => {
                    println!(
                        "  ⚠️  Model {} not installed — run `ollama pull {}`",
                        config.ollama.model, config.ollama.model
                    );
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Could not list Ollama models: {e}");
                    issues += 1;
                }
            }
        }
        Ok(false) | Err(_) => {
            println!("  ❌ Ollama not reachable at {}", provider.base_url());
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Ollama reports untagged models as `name:latest`.
fn model_installed(installed: &[String], model: &str) -> bool {
    installed
        .iter()
        .any(|m| m == model || (!model.contains(':') && *m == format!("{model}:latest")))
}
