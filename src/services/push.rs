use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::models::push::PushRequest;

/// Client for the outbound push-notification dispatch endpoint.
pub struct PushClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl PushClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Forward a notification upstream. Returns the dispatch timestamp.
    pub async fn dispatch(&self, note: &PushRequest) -> Result<DateTime<Utc>, PushError> {
        let sent_at = Utc::now();

        let request_body = serde_json::json!({
            "to": note.to,
            "title": note.title,
            "body": note.body,
            "sent_at": sent_at,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(PushError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(sent_at)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("HTTP request to push provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
}
