use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Inbound body for POST /api/v1/generate.
///
/// A body carrying `queue_id` resumes polling an already-submitted job;
/// anything else must describe a new one. The gateway never persists jobs, so
/// the queue id is the caller's only handle for resumption.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenerateRequest {
    Resume(ResumeRequest),
    New(NewGenerationRequest),
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResumeRequest {
    #[garde(length(min = 1, max = 256))]
    pub queue_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewGenerationRequest {
    /// Base64 data URL of the source image.
    #[garde(length(min = 1))]
    pub image: String,

    /// Clip length in seconds. Only 5 and 10 are supported.
    #[garde(skip)]
    pub duration: DurationArg,

    #[garde(length(max = 2000))]
    pub prompt: Option<String>,

    /// Requested output tier; anything unrecognized falls back to the default.
    #[garde(skip)]
    pub quality: Option<String>,
}

/// Callers send the duration as either a bare number or a string ("5" / 5).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationArg {
    Number(i64),
    Text(String),
}

impl DurationArg {
    /// Map the caller's value onto the provider duration token, or `None` if
    /// the value is outside the supported set.
    pub fn as_token(&self) -> Option<&'static str> {
        let normalized = match self {
            DurationArg::Number(n) => n.to_string(),
            DurationArg::Text(s) => s.trim().to_string(),
        };
        match normalized.as_str() {
            "5" => Some("5s"),
            "10" => Some("10s"),
            _ => None,
        }
    }
}

/// Output tiers the provider supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Resolution {
    #[serde(rename = "480p")]
    #[strum(serialize = "480p")]
    Sd480,
    #[serde(rename = "720p")]
    #[strum(serialize = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    #[strum(serialize = "1080p")]
    Fhd1080,
}

impl Resolution {
    /// Parse a caller-supplied quality value, falling back to the lowest tier
    /// for anything absent or unrecognized.
    pub fn from_loose(raw: Option<&str>) -> Self {
        Self::from_loose_or(raw, Resolution::Sd480)
    }

    /// Like [`Resolution::from_loose`], but with a caller-chosen fallback.
    pub fn from_loose_or(raw: Option<&str>, fallback: Resolution) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or(fallback)
    }
}

/// 202 body returned when the polling budget elapses before a terminal state.
#[derive(Debug, Serialize)]
pub struct ProcessingResponse {
    pub status: &'static str,
    pub queue_id: String,
}

impl ProcessingResponse {
    pub fn new(queue_id: String) -> Self {
        Self {
            status: "PROCESSING",
            queue_id,
        }
    }
}

/// A decoded `data:` URL payload.
#[derive(Debug)]
pub struct ImagePayload {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Decode a base64 `data:` URL. Returns `None` for anything that is not a
/// well-formed base64 data URL; media-type checks are the caller's job.
pub fn decode_data_url(raw: &str) -> Option<ImagePayload> {
    use base64::Engine;

    let rest = raw.strip_prefix("data:")?;
    let (media_type, payload) = rest.split_once(";base64,")?;
    if media_type.is_empty() {
        return None;
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some(ImagePayload {
        media_type: media_type.to_string(),
        bytes,
    })
}
