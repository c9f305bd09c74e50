use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::errors::ApiError;
use crate::models::push::{NotifyResponse, PushRequest};

/// POST /api/v1/notify — forward a push notification upstream.
///
/// Guarded by a static bearer token; the constant-shape compare against the
/// configured shared secret is the gateway's only authentication check.
pub async fn notify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(raw): Json<serde_json::Value>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented != Some(state.push_shared_secret.as_str()) {
        return Err(ApiError::Unauthorized);
    }

    let request: PushRequest = serde_json::from_value(raw)
        .map_err(|e| ApiError::validation("body", e.to_string()))?;

    request
        .validate()
        .map_err(|e| ApiError::validation("notification", e.to_string()))?;

    let sent_at = state.push.dispatch(&request).await?;
    metrics::counter!("push_notifications_total").increment(1);

    tracing::info!(title = %request.title, "push notification dispatched");

    Ok(Json(NotifyResponse {
        status: "sent",
        sent_at,
    }))
}
