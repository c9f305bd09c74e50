mod app_state;
mod config;
mod errors;
mod models;
mod routes;
mod services;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{
    chat::{ChatBackend, ChatClient},
    push::PushClient,
    video::VideoClient,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing gengate server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "generation_jobs_total",
        "Video generation jobs submitted upstream"
    );
    metrics::describe_counter!(
        "generation_polls_total",
        "Status polls issued to the video provider"
    );
    metrics::describe_counter!(
        "generation_artifacts_relayed_total",
        "Binary artifacts streamed back to callers"
    );
    metrics::describe_histogram!(
        "generation_poll_wait_seconds",
        "Wall-clock time spent waiting on a generation job"
    );
    metrics::describe_counter!("chat_requests_total", "Chat completions forwarded upstream");
    metrics::describe_counter!("push_notifications_total", "Push notifications dispatched");

    // Initialize upstream clients
    tracing::info!("Initializing video provider client");
    let video_client = VideoClient::new(
        &config.video_api_base,
        &config.video_api_key,
        &config.video_model,
    );

    tracing::info!("Initializing chat backends");
    let chat_client = ChatClient::new(
        ChatBackend::new(
            &config.chat_free_api_base,
            &config.chat_free_api_key,
            &config.chat_free_model,
        ),
        ChatBackend::new(
            &config.chat_premium_api_base,
            &config.chat_premium_api_key,
            &config.chat_premium_model,
        ),
    );

    tracing::info!("Initializing push dispatch client");
    let push_client = PushClient::new(&config.push_api_url, &config.push_api_key);

    // Create shared application state
    let state = AppState::new(
        video_client,
        chat_client,
        push_client,
        config.generation_defaults(),
        config.status_vocabulary(),
        config.submit_plan(),
        config.resume_plan(),
        config.push_shared_secret.clone(),
    );

    // Build API routes
    let app = routes::api_router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(25 * 1024 * 1024)); // 25 MB limit for base64 image payloads

    tracing::info!("Starting gengate on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
