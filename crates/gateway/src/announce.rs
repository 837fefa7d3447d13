//! Startup announcement sent through LINE when the server comes up.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::AppContext;

/// Compose the startup text for `model` at local time `now`.
pub fn startup_message(model: &str, now: &DateTime<Tz>) -> String {
    format!(
        "🤖 機器視覺課程助教機器人已啟動！\n系統已就緒，歡迎使用。\n目前的Ollama模型：{model}\n啟動時間：{} ({})",
        now.format("%Y-%m-%d %H:%M:%S"),
        zone_label(now.timezone())
    )
}

/// Label shown after the timestamp: "台灣時間" for Taipei, else the IANA name.
pub fn zone_label(tz: Tz) -> &'static str {
    match tz {
        Tz::Asia__Taipei => "台灣時間",
        other => other.name(),
    }
}

/// Current time in `tz`.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Push the startup message to the configured target, or broadcast it.
///
/// Returns whether delivery succeeded. Failures are logged, never raised.
pub async fn send_startup_message(ctx: &AppContext) -> bool {
    let tz = match ctx.config.startup.tz() {
        Ok(tz) => tz,
        Err(e) => {
            warn!(error = %e, "Startup message skipped");
            return false;
        }
    };
    let text = startup_message(ctx.assistant.model(), &now_in(tz));

    let result = match ctx.config.line.startup_target.as_deref() {
        Some(target) => ctx.channel.push(target, &text).await,
        None => ctx.channel.broadcast(&text).await,
    };

    match result {
        Ok(()) => {
            info!(channel = ctx.channel.name(), "Startup message sent");
            true
        }
        Err(e) => {
            warn!(error = %e, "Failed to send startup message");
            false
        }
    }
}
