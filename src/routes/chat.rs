use axum::extract::State;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::errors::ApiError;
use crate::models::chat::{ChatRequest, ChatResponse};

/// POST /api/v1/chat — validate and forward a conversation to the chat
/// backend matching the caller's payment tier.
pub async fn chat(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request: ChatRequest = serde_json::from_value(raw)
        .map_err(|e| ApiError::validation("body", e.to_string()))?;

    request
        .validate()
        .map_err(|e| ApiError::validation("messages", e.to_string()))?;

    let tier = if request.premium { "premium" } else { "free" };
    metrics::counter!("chat_requests_total", "tier" => tier).increment(1);

    let response = state.chat.complete(&request).await?;

    tracing::info!(
        tier,
        model = %response.model,
        messages = request.messages.len(),
        "chat completion forwarded"
    );

    Ok(Json(response))
}
