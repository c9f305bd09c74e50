use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::models::generation::Resolution;

/// Client for the queue-based video generation provider.
///
/// Submission and retrieval are two independent calls correlated only by the
/// provider-issued queue id; the gateway keeps no record of jobs in between.
pub struct VideoClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// A fully-resolved submission: caller input merged with the configured
/// fallbacks, ready to put on the wire.
#[derive(Debug)]
pub struct SubmissionSpec {
    /// Source image as a base64 data URL, passed through to the provider.
    pub image: String,
    pub prompt: String,
    /// Provider duration token ("5s" / "10s").
    pub duration_token: &'static str,
    pub resolution: Resolution,
    pub aspect_ratio: String,
    pub audio: bool,
}

#[derive(Deserialize)]
struct SubmitResponse {
    queue_id: Option<String>,
}

/// One raw reply from the provider's result endpoint: either a JSON status
/// document or the binary artifact itself.
pub enum ProviderReply {
    Json(serde_json::Value),
    Binary {
        media_type: String,
        response: reqwest::Response,
    },
}

impl VideoClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a new generation job. Returns the provider's correlation id.
    pub async fn submit(&self, spec: &SubmissionSpec) -> Result<String, VideoError> {
        let url = format!("{}/v1/jobs", self.base_url);

        let request_body = serde_json::json!({
            "model": self.model,
            "prompt": spec.prompt,
            "duration": spec.duration_token,
            "image": spec.image,
            "aspect_ratio": spec.aspect_ratio,
            "resolution": spec.resolution.to_string(),
            "audio": spec.audio,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(VideoError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VideoError::Submission {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SubmitResponse = response.json().await.map_err(VideoError::Http)?;
        parsed
            .queue_id
            .filter(|id| !id.is_empty())
            .ok_or(VideoError::MissingQueueId)
    }

    /// Fetch the current state of a job. The `delete_after_read` flag asks the
    /// provider to drop the artifact once served (at-most-once retrieval).
    pub async fn fetch(&self, queue_id: &str) -> Result<ProviderReply, VideoError> {
        let url = format!("{}/v1/jobs/result", self.base_url);

        let request_body = serde_json::json!({
            "model": self.model,
            "queue_id": queue_id,
            "delete_after_read": true,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(VideoError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VideoError::Poll {
                status: status.as_u16(),
                body,
            });
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        if media_type.starts_with("application/json") {
            let payload = response
                .json::<serde_json::Value>()
                .await
                .map_err(VideoError::Http)?;
            Ok(ProviderReply::Json(payload))
        } else {
            // The artifact itself. Hand the open response back so the route
            // layer can stream it without materializing the body.
            Ok(ProviderReply::Binary {
                media_type,
                response,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("HTTP request to video provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("video provider rejected submission with HTTP {status}: {body}")]
    Submission { status: u16, body: String },

    #[error("video provider status check failed with HTTP {status}: {body}")]
    Poll { status: u16, body: String },

    #[error("video provider accepted the job but returned no queue id")]
    MissingQueueId,
}
