use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::config::GenerationDefaults;
use crate::errors::ApiError;
use crate::models::generation::{
    decode_data_url, GenerateRequest, NewGenerationRequest, ProcessingResponse, Resolution,
};
use crate::services::poller::{self, PollOutcome};
use crate::services::video::SubmissionSpec;

/// POST /api/v1/generate — submit a new image-to-video job, or resume polling
/// an existing one, and drive it to a terminal state within the time budget.
///
/// The body is deserialized by hand so shape mismatches come back as 400s in
/// the gateway's error format rather than the extractor's 422.
pub async fn generate(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let request: GenerateRequest = serde_json::from_value(raw)
        .map_err(|e| ApiError::validation("body", e.to_string()))?;

    let request_id = Uuid::new_v4();
    let started = std::time::Instant::now();

    let outcome = match request {
        GenerateRequest::Resume(resume) => {
            resume
                .validate()
                .map_err(|e| ApiError::validation("queue_id", e.to_string()))?;

            tracing::info!(
                request_id = %request_id,
                queue_id = %resume.queue_id,
                "resuming generation poll"
            );

            poller::poll_until_settled(
                &state.video,
                &state.vocab,
                &resume.queue_id,
                &state.resume_plan,
            )
            .await?
        }
        GenerateRequest::New(new) => {
            let spec = build_submission(&new, &state.defaults)?;

            let queue_id = state.video.submit(&spec).await?;
            metrics::counter!("generation_jobs_total").increment(1);

            tracing::info!(
                request_id = %request_id,
                queue_id = %queue_id,
                duration = spec.duration_token,
                resolution = %spec.resolution,
                "generation job submitted"
            );

            poller::poll_until_settled(&state.video, &state.vocab, &queue_id, &state.submit_plan)
                .await?
        }
    };

    metrics::histogram!("generation_poll_wait_seconds").record(started.elapsed().as_secs_f64());

    respond(outcome)
}

/// Merge caller input with the configured fallbacks, validating strictly
/// before anything goes near the network.
fn build_submission(
    request: &NewGenerationRequest,
    defaults: &GenerationDefaults,
) -> Result<SubmissionSpec, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::validation("request", e.to_string()))?;

    let duration_token = request.duration.as_token().ok_or(ApiError::Validation {
        field: "duration",
        detail: "unsupported duration".to_string(),
        accepted: Some(serde_json::json!([5, 10])),
    })?;

    let payload = decode_data_url(&request.image)
        .ok_or_else(|| ApiError::validation("image", "must be a base64 image data URL"))?;
    if !payload.media_type.starts_with("image/") {
        return Err(ApiError::validation("image", "media type is not an image"));
    }
    image::guess_format(&payload.bytes)
        .map_err(|_| ApiError::validation("image", "payload is not a recognizable image"))?;

    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(&defaults.prompt)
        .to_string();

    let resolution = Resolution::from_loose_or(request.quality.as_deref(), defaults.resolution);

    Ok(SubmissionSpec {
        image: request.image.clone(),
        prompt,
        duration_token,
        resolution,
        aspect_ratio: defaults.aspect_ratio.clone(),
        audio: defaults.audio,
    })
}

/// Translate a poll outcome into the HTTP response contract.
fn respond(outcome: PollOutcome) -> Result<Response, ApiError> {
    match outcome {
        PollOutcome::SuccessBinary {
            media_type,
            response,
        } => {
            metrics::counter!("generation_artifacts_relayed_total").increment(1);

            // Relay the artifact chunk-by-chunk; the body is never
            // materialized in gateway memory.
            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, media_type);
            if let Some(length) = response.content_length() {
                builder = builder.header(CONTENT_LENGTH, length);
            }
            builder
                .body(Body::from_stream(response.bytes_stream()))
                .map_err(|e| ApiError::Internal(e.to_string()))
        }
        PollOutcome::SuccessUrl(payload) => Ok((StatusCode::OK, Json(payload)).into_response()),
        PollOutcome::StillProcessing { queue_id, polls } => {
            tracing::info!(queue_id = %queue_id, polls, "returning resumable processing response");
            Ok((
                StatusCode::ACCEPTED,
                Json(ProcessingResponse::new(queue_id)),
            )
                .into_response())
        }
        PollOutcome::Failure(payload) => Err(ApiError::GenerationFailed { payload }),
        PollOutcome::ContractViolation { payload } => Err(ApiError::MalformedUpstream {
            detail: format!("unrecognized provider status: {payload}"),
        }),
    }
}
