use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Inbound body for POST /api/v1/notify.
#[derive(Debug, Deserialize, Validate)]
pub struct PushRequest {
    /// Opaque device token understood by the push provider.
    #[garde(length(min = 1, max = 4096))]
    pub to: String,

    #[garde(length(min = 1, max = 200))]
    pub title: String,

    #[garde(length(min = 1, max = 2000))]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub status: &'static str,
    pub sent_at: DateTime<Utc>,
}
