use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::services::chat::ChatError;
use crate::services::push::PushError;
use crate::services::video::VideoError;

/// Route-level error taxonomy. Every failure a handler can produce maps to
/// exactly one variant, and every variant to one HTTP status; nothing escapes
/// as a raw crash.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid {field}: {detail}")]
    Validation {
        field: &'static str,
        detail: String,
        accepted: Option<serde_json::Value>,
    },

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("video provider rejected submission with HTTP {status}")]
    SubmissionRejected { status: u16, body: String },

    #[error("video provider status check failed with HTTP {status}")]
    PollFailed { status: u16, body: String },

    #[error("malformed upstream response: {detail}")]
    MalformedUpstream { detail: String },

    #[error("provider reported generation failure")]
    GenerationFailed { payload: serde_json::Value },

    #[error("chat provider returned HTTP {status}")]
    ChatUpstream { status: u16, body: String },

    #[error("push provider returned HTTP {status}")]
    PushUpstream { status: u16, body: String },

    #[error("upstream provider unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(field: &'static str, detail: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            detail: detail.into(),
            accepted: None,
        }
    }
}

impl From<VideoError> for ApiError {
    fn from(error: VideoError) -> Self {
        match error {
            VideoError::Http(e) => ApiError::UpstreamUnreachable(e.to_string()),
            VideoError::Submission { status, body } => {
                ApiError::SubmissionRejected { status, body }
            }
            VideoError::Poll { status, body } => ApiError::PollFailed { status, body },
            VideoError::MissingQueueId => ApiError::MalformedUpstream {
                detail: "job accepted but no queue id returned".to_string(),
            },
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::Http(e) => ApiError::UpstreamUnreachable(e.to_string()),
            ChatError::Upstream { status, body } => ApiError::ChatUpstream { status, body },
            ChatError::EmptyCompletion => ApiError::MalformedUpstream {
                detail: "completion carried no content".to_string(),
            },
        }
    }
}

impl From<PushError> for ApiError {
    fn from(error: PushError) -> Self {
        match error {
            PushError::Http(e) => ApiError::UpstreamUnreachable(e.to_string()),
            PushError::Upstream { status, body } => ApiError::PushUpstream { status, body },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation {
                field,
                detail,
                accepted,
            } => {
                let mut body = json!({
                    "error": "invalid_request",
                    "field": field,
                    "detail": detail,
                });
                if let Some(accepted) = accepted {
                    body["accepted"] = accepted.clone();
                }
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "unauthorized" }),
            ),
            ApiError::SubmissionRejected { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream_submission_failed",
                    "upstream_status": status,
                    "detail": body,
                }),
            ),
            ApiError::PollFailed { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream_poll_failed",
                    "upstream_status": status,
                    "detail": body,
                }),
            ),
            ApiError::MalformedUpstream { detail } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "malformed_upstream_response",
                    "detail": detail,
                }),
            ),
            ApiError::GenerationFailed { payload } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "generation_failed",
                    "provider": payload,
                }),
            ),
            ApiError::ChatUpstream { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream_chat_failed",
                    "upstream_status": status,
                    "detail": body,
                }),
            ),
            ApiError::PushUpstream { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream_push_failed",
                    "upstream_status": status,
                    "detail": body,
                }),
            ),
            ApiError::UpstreamUnreachable(detail) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream_unreachable",
                    "detail": detail,
                }),
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "internal_error",
                    "detail": detail,
                }),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
