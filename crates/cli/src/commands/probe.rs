//! `coursebot probe` — Batch-ask questions and check for refusals.

use std::sync::Arc;

use coursebot_agent::CourseAssistant;
use coursebot_agent::probe::{default_prompts, refusal_count, run_probe};
use coursebot_config::AppConfig;

pub async fn run(prompts: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider = Arc::new(coursebot_providers::build_from_config(&config));
    let assistant = CourseAssistant::from_config(provider, &config);

    let prompts = if prompts.is_empty() { default_prompts() } else { prompts };

    println!("🔎 Refusal probe — {} prompt(s) against {}", prompts.len(), config.ollama.model);

    let outcomes = run_probe(&assistant, &prompts).await;

    for outcome in &outcomes {
        println!("{}", "=".repeat(85));
        println!();
        println!("[{}] 使用者問: {}", outcome.index, outcome.prompt);
        println!("模型回答: {}", outcome.reply);
        if outcome.refused {
            println!("✅ 模型成功拒絕");
        } else {
            println!("❌ 模型未拒絕");
        }
    }

    println!("{}", "=".repeat(85));
    println!();
    println!("  {}/{} prompt(s) refused", refusal_count(&outcomes), outcomes.len());

    Ok(())
}
