//! Test helper utilities: spawn the gateway and scripted mock providers on
//! ephemeral ports, then drive them with reqwest.
#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use gengate::app_state::AppState;
use gengate::config::{GenerationDefaults, PollPlan, StatusVocabulary};
use gengate::models::generation::Resolution;
use gengate::routes::api_router;
use gengate::services::chat::{ChatBackend, ChatClient};
use gengate::services::push::PushClient;
use gengate::services::video::VideoClient;

/// 1x1 transparent PNG, base64-encoded.
pub const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

pub fn png_data_url() -> String {
    format!("data:image/png;base64,{PNG_B64}")
}

/// Bind a router to an ephemeral port and serve it in the background.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock server error");
    });
    format!("http://{addr}")
}

// ── Mock video provider ──────────────────────────────────────────

/// Scripted behavior for the provider's submission endpoint.
#[derive(Clone)]
pub enum SubmitScript {
    /// Accept and issue the provider's queue id.
    Accept,
    /// Reject with the given HTTP status and body.
    Reject(u16, &'static str),
    /// Return HTTP 200 but omit the queue id (contract violation).
    AcceptWithoutId,
}

/// Scripted behavior for the provider's result endpoint.
#[derive(Clone)]
pub enum PollScript {
    /// N "processing" replies, then the binary artifact.
    ProcessingThenBinary {
        processing_replies: usize,
        media_type: &'static str,
        bytes: Vec<u8>,
    },
    /// Never finishes.
    AlwaysProcessing,
    /// Terminal JSON reply on the first poll (failure, URL success, or
    /// anything else the test wants verbatim).
    Reply(serde_json::Value),
    /// Non-2xx HTTP status on every poll.
    HttpError(u16, &'static str),
}

/// Everything the mock recorded about provider traffic.
#[derive(Default)]
pub struct ProviderLog {
    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
    pub last_submit_body: Mutex<Option<serde_json::Value>>,
    pub last_poll_body: Mutex<Option<serde_json::Value>>,
}

struct MockVideoState {
    submit: SubmitScript,
    poll: PollScript,
    queue_id: String,
    log: Arc<ProviderLog>,
}

pub struct MockVideoProvider {
    pub base_url: String,
    pub queue_id: String,
    pub log: Arc<ProviderLog>,
}

pub async fn spawn_video_provider(poll: PollScript) -> MockVideoProvider {
    spawn_video_provider_with(SubmitScript::Accept, poll).await
}

pub async fn spawn_video_provider_with(
    submit: SubmitScript,
    poll: PollScript,
) -> MockVideoProvider {
    let log = Arc::new(ProviderLog::default());
    let queue_id = "queue-7f3a".to_string();
    let state = Arc::new(MockVideoState {
        submit,
        poll,
        queue_id: queue_id.clone(),
        log: Arc::clone(&log),
    });

    let app = Router::new()
        .route("/v1/jobs", post(mock_submit))
        .route("/v1/jobs/result", post(mock_result))
        .with_state(state);

    MockVideoProvider {
        base_url: serve(app).await,
        queue_id,
        log,
    }
}

async fn mock_submit(
    State(state): State<Arc<MockVideoState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.log.submits.fetch_add(1, SeqCst);
    *state.log.last_submit_body.lock().unwrap() = Some(body);

    match &state.submit {
        SubmitScript::Accept => {
            Json(serde_json::json!({ "queue_id": state.queue_id })).into_response()
        }
        SubmitScript::Reject(status, body) => (
            StatusCode::from_u16(*status).unwrap(),
            body.to_string(),
        )
            .into_response(),
        SubmitScript::AcceptWithoutId => {
            Json(serde_json::json!({ "accepted": true })).into_response()
        }
    }
}

async fn mock_result(
    State(state): State<Arc<MockVideoState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let seen = state.log.polls.fetch_add(1, SeqCst);
    *state.log.last_poll_body.lock().unwrap() = Some(body);

    match &state.poll {
        PollScript::ProcessingThenBinary {
            processing_replies,
            media_type,
            bytes,
        } => {
            if seen < *processing_replies {
                Json(serde_json::json!({ "status": "processing" })).into_response()
            } else {
                ([(CONTENT_TYPE, *media_type)], bytes.clone()).into_response()
            }
        }
        PollScript::AlwaysProcessing => {
            Json(serde_json::json!({ "status": "queued" })).into_response()
        }
        PollScript::Reply(payload) => Json(payload.clone()).into_response(),
        PollScript::HttpError(status, body) => (
            StatusCode::from_u16(*status).unwrap(),
            body.to_string(),
        )
            .into_response(),
    }
}

// ── Mock chat provider ───────────────────────────────────────────

#[derive(Default)]
pub struct ChatLog {
    pub hits: AtomicUsize,
    pub last_body: Mutex<Option<serde_json::Value>>,
    pub last_auth: Mutex<Option<String>>,
}

struct MockChatState {
    fail_status: Option<u16>,
    log: Arc<ChatLog>,
}

pub struct MockChatProvider {
    pub base_url: String,
    pub log: Arc<ChatLog>,
}

pub async fn spawn_chat_provider(fail_status: Option<u16>) -> MockChatProvider {
    let log = Arc::new(ChatLog::default());
    let state = Arc::new(MockChatState {
        fail_status,
        log: Arc::clone(&log),
    });

    let app = Router::new()
        .route("/v1/chat/completions", post(mock_completions))
        .with_state(state);

    MockChatProvider {
        base_url: serve(app).await,
        log,
    }
}

async fn mock_completions(
    State(state): State<Arc<MockChatState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.log.hits.fetch_add(1, SeqCst);
    *state.log.last_body.lock().unwrap() = Some(body);
    *state.log.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if let Some(status) = state.fail_status {
        return (StatusCode::from_u16(status).unwrap(), "upstream sad").into_response();
    }

    Json(serde_json::json!({
        "choices": [
            { "message": { "role": "assistant", "content": "mock reply" } }
        ]
    }))
    .into_response()
}

// ── Mock push provider ───────────────────────────────────────────

#[derive(Default)]
pub struct PushLog {
    pub hits: AtomicUsize,
    pub last_body: Mutex<Option<serde_json::Value>>,
    pub last_auth: Mutex<Option<String>>,
}

pub struct MockPushProvider {
    pub base_url: String,
    pub log: Arc<PushLog>,
}

pub async fn spawn_push_provider() -> MockPushProvider {
    let log = Arc::new(PushLog::default());

    async fn handle(
        State(log): State<Arc<PushLog>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        log.hits.fetch_add(1, SeqCst);
        *log.last_body.lock().unwrap() = Some(body);
        *log.last_auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Json(serde_json::json!({ "ok": true }))
    }

    let app = Router::new()
        .route("/push", post(handle))
        .with_state(Arc::clone(&log));

    MockPushProvider {
        base_url: serve(app).await,
        log,
    }
}

// ── Gateway under test ───────────────────────────────────────────

pub const VIDEO_MODEL: &str = "i2v-test";
pub const SHARED_SECRET: &str = "front-end-secret";

pub struct GatewayOptions {
    pub submit_plan: PollPlan,
    pub resume_plan: PollPlan,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            submit_plan: PollPlan {
                interval: Duration::from_millis(50),
                max_wait: Duration::from_secs(10),
            },
            resume_plan: PollPlan {
                interval: Duration::from_millis(50),
                max_wait: Duration::from_secs(10),
            },
        }
    }
}

/// Spawn the gateway wired to the given upstream base URLs; returns its base
/// URL.
pub async fn spawn_gateway(
    video_base: &str,
    chat_base: &str,
    push_base: &str,
    options: GatewayOptions,
) -> String {
    let state = AppState::new(
        VideoClient::new(video_base, "video-test-key", VIDEO_MODEL),
        ChatClient::new(
            ChatBackend::new(chat_base, "free-key", "free-model"),
            ChatBackend::new(chat_base, "premium-key", "premium-model"),
        ),
        PushClient::new(&format!("{push_base}/push"), "push-api-key"),
        GenerationDefaults {
            prompt: "default prompt".to_string(),
            resolution: Resolution::Sd480,
            aspect_ratio: "16:9".to_string(),
            audio: false,
        },
        StatusVocabulary::default(),
        options.submit_plan,
        options.resume_plan,
        SHARED_SECRET.to_string(),
    );

    serve(api_router(state)).await
}

/// Spawn a gateway whose chat and push upstreams are stubs nothing talks to;
/// for tests that only exercise the generation path.
pub async fn spawn_generation_gateway(video_base: &str, options: GatewayOptions) -> String {
    spawn_gateway(video_base, "http://127.0.0.1:9", "http://127.0.0.1:9", options).await
}
