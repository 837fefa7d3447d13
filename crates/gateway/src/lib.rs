//! HTTP gateway for coursebot.
//!
//! Receives LINE webhooks, answers each text message through the course
//! assistant, and replies via the LINE Messaging API.
//!
//! Routes:
//! - `POST /webhook` — signed LINE events (`X-Line-Signature`)
//! - `GET /test` — liveness text
//!
//! Built on Axum.

pub mod announce;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use coursebot_agent::CourseAssistant;
use coursebot_channels::line::{SIGNATURE_HEADER, SignatureVerifier, parse_events};
use coursebot_config::{AppConfig, ConfigError};
use coursebot_core::channel::{Channel, IncomingMessage};
use coursebot_core::course::CourseInfo;

/// Body of `GET /test`.
pub const STATUS_TEXT: &str = "Course assistant bot is running";

/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Everything a request handler needs, created once at startup.
pub struct AppContext {
    pub assistant: Arc<CourseAssistant>,
    pub channel: Arc<dyn Channel>,
    pub verifier: SignatureVerifier,
    pub course: RwLock<CourseInfo>,
    pub config: AppConfig,
}

type SharedContext = Arc<AppContext>;

impl AppContext {
    /// Assemble a context; the course store starts with the sample data.
    pub fn new(
        assistant: Arc<CourseAssistant>,
        channel: Arc<dyn Channel>,
        verifier: SignatureVerifier,
        config: AppConfig,
    ) -> Self {
        Self {
            assistant,
            channel,
            verifier,
            course: RwLock::new(CourseInfo::sample()),
            config,
        }
    }

    /// Build the LINE channel, Ollama provider and assistant from config.
    ///
    /// Fails when the LINE credentials are missing.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let (channel, verifier) = coursebot_channels::line_from_config(&config)?;
        let provider = Arc::new(coursebot_providers::build_from_config(&config));
        let assistant = Arc::new(CourseAssistant::from_config(provider, &config));
        Ok(Self::new(assistant, Arc::new(channel), verifier, config))
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/test", get(status_handler))
        .route("/webhook", post(webhook_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the gateway HTTP server and serve until Ctrl-C.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let ctx = Arc::new(AppContext::from_config(config)?);

    {
        let course = ctx.course.read().await;
        debug!(
            announcements = course.announcements().len(),
            assignments = course.assignments().count(),
            topics = course.topics().count(),
            "Course data loaded"
        );
    }

    if ctx.config.startup.announce {
        announce::send_startup_message(&ctx).await;
    }

    info!(
        addr = %addr,
        webhook_url = %ctx.config.gateway.webhook_url,
        model = %ctx.assistant.model(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- Handlers ---

async fn status_handler() -> &'static str {
    STATUS_TEXT
}

async fn webhook_handler(
    State(ctx): State<SharedContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, StatusCode> {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("Webhook rejected: missing signature header");
        return Err(StatusCode::BAD_REQUEST);
    };

    if let Err(e) = ctx.verifier.check(&body, signature) {
        warn!(error = %e, "Webhook rejected");
        return Err(StatusCode::BAD_REQUEST);
    }

    let messages = match parse_events(&body) {
        Ok(messages) => messages,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable webhook payload");
            return Ok("OK");
        }
    };

    for message in messages {
        handle_message(&ctx, message).await;
    }

    Ok("OK")
}

async fn handle_message(ctx: &AppContext, message: IncomingMessage) {
    info!(
        sender = message.sender_id.as_deref().unwrap_or("unknown"),
        text_len = message.text.len(),
        "Text message received"
    );

    let reply = ctx.assistant.answer(&message.text).await;

    if let Err(e) = ctx.channel.reply(&message.reply_token, &reply).await {
        error!(error = %e, "Reply message error");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use coursebot_agent::test_helpers::ScriptedProvider;
    use coursebot_core::error::{ChannelError, ProviderError};
    use coursebot_core::message::Role;
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const SECRET: &str = "test-channel-secret";

    /// Records every delivery as `(kind, target, text)`.
    #[derive(Default)]
    pub(crate) struct RecordingChannel {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl RecordingChannel {
        pub(crate) fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub(crate) fn sent(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }

        fn record(&self, kind: &str, target: &str, text: &str) -> Result<(), ChannelError> {
            if self.fail {
                return Err(ChannelError::DeliveryFailed {
                    channel: "recording".into(),
                    reason: "rejected".into(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((kind.into(), target.into(), text.into()));
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn reply(&self, reply_token: &str, content: &str) -> Result<(), ChannelError> {
            self.record("reply", reply_token, content)
        }

        async fn push(&self, to: &str, content: &str) -> Result<(), ChannelError> {
            self.record("push", to, content)
        }

        async fn broadcast(&self, content: &str) -> Result<(), ChannelError> {
            self.record("broadcast", "", content)
        }
    }

    pub(crate) fn context(provider: Arc<ScriptedProvider>, channel: Arc<RecordingChannel>) -> AppContext {
        let config = AppConfig::default();
        let assistant = Arc::new(CourseAssistant::from_config(provider, &config));
        AppContext::new(assistant, channel, SignatureVerifier::new(SECRET), config)
    }

    fn text_event(reply_token: &str, text: &str) -> String {
        serde_json::json!({
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "replyToken": reply_token,
                "source": { "type": "user", "userId": "U123" },
                "timestamp": 1_700_000_000_000_u64,
                "mode": "active",
                "message": { "type": "text", "id": "1", "text": text }
            }]
        })
        .to_string()
    }

    fn signed_request(body: impl Into<String>) -> Request<Body> {
        let body = body.into();
        let signature = SignatureVerifier::new(SECRET).sign(body.as_bytes());
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn status_endpoint() {
        let ctx = context(
            Arc::new(ScriptedProvider::replies(&[])),
            Arc::new(RecordingChannel::default()),
        );
        let app = build_router(Arc::new(ctx));

        let req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, STATUS_TEXT);
    }

    #[tokio::test]
    async fn signed_text_event_is_answered() {
        let provider = Arc::new(ScriptedProvider::replies(&[
            "<think>\n公告問題，可以回答\n</think>\n\n期中考：2025/04/23",
        ]));
        let channel = Arc::new(RecordingChannel::default());
        let app = build_router(Arc::new(context(provider.clone(), channel.clone())));

        let response = app.oneshot(signed_request(text_event("r-1", "有什麼公告"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let roles: Vec<Role> = requests[0].messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(requests[0].messages[2].content(), "有什麼公告");

        assert_eq!(
            channel.sent(),
            vec![(
                "reply".to_string(),
                "r-1".to_string(),
                "期中考：2025/04/23".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn missing_signature_is_bad_request() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let channel = Arc::new(RecordingChannel::default());
        let app = build_router(Arc::new(context(provider.clone(), channel.clone())));

        let req = Request::builder()
            .method("POST")
            .uri("/webhook")
            .body(Body::from(text_event("r-1", "hi")))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(provider.requests().is_empty());
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_signature_is_bad_request() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let channel = Arc::new(RecordingChannel::default());
        let app = build_router(Arc::new(context(provider.clone(), channel.clone())));

        let forged = SignatureVerifier::new("someone-else").sign(text_event("r-1", "hi").as_bytes());
        let req = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(SIGNATURE_HEADER, forged)
            .body(Body::from(text_event("r-1", "hi")))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_with_valid_signature_is_ok() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let channel = Arc::new(RecordingChannel::default());
        let app = build_router(Arc::new(context(provider.clone(), channel.clone())));

        let response = app.oneshot(signed_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn non_text_events_are_ignored() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let channel = Arc::new(RecordingChannel::default());
        let app = build_router(Arc::new(context(provider.clone(), channel.clone())));

        let body = r#"{"destination":"Ubot","events":[{"type":"follow","replyToken":"r-9","source":{"type":"user","userId":"U1"}}]}"#;
        let response = app.oneshot(signed_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(provider.requests().is_empty());
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn model_failure_is_replied_as_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::ModelNotFound(
            "llama2:13b-chat".into(),
        ))]));
        let channel = Arc::new(RecordingChannel::default());
        let app = build_router(Arc::new(context(provider, channel.clone())));

        let response = app.oneshot(signed_request(text_event("r-2", "hi"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].2.starts_with("生成回應時發生錯誤: "));
        assert!(sent[0].2.contains("llama2:13b-chat"));
    }

    #[tokio::test]
    async fn delivery_failure_still_ok() {
        let provider = Arc::new(ScriptedProvider::replies(&["hello"]));
        let app = build_router(Arc::new(context(provider, Arc::new(RecordingChannel::failing()))));

        let response = app.oneshot(signed_request(text_event("r-3", "hi"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let app = build_router(Arc::new(context(provider, Arc::new(RecordingChannel::default()))));

        let response = app
            .oneshot(signed_request("x".repeat(MAX_BODY_BYTES + 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn course_store_starts_seeded_and_accepts_updates() {
        let ctx = context(
            Arc::new(ScriptedProvider::replies(&[])),
            Arc::new(RecordingChannel::default()),
        );
        ctx.course.write().await.add_announcement("期中考延期一週");

        let course = ctx.course.read().await;
        assert_eq!(course.announcements().len(), 3);
        assert!(course.assignment("作業一").is_some());
    }

    #[test]
    fn from_config_requires_line_credentials() {
        let err = AppContext::from_config(AppConfig::default()).err().unwrap();
        assert!(matches!(err, ConfigError::MissingCredentials(ref missing) if missing.len() == 2));
    }
}
