use serde::Deserialize;
use std::time::Duration;

use crate::models::generation::Resolution;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the queue-based video generation provider
    pub video_api_base: String,

    /// Video provider API token
    pub video_api_key: String,

    /// Model identifier echoed on every submission and poll
    #[serde(default = "default_video_model")]
    pub video_model: String,

    /// Prompt used when the caller sends none (or only whitespace)
    #[serde(default = "default_prompt")]
    pub default_prompt: String,

    /// Resolution used when the caller's quality value is absent or invalid
    #[serde(default = "default_resolution")]
    pub default_resolution: String,

    /// Aspect ratio sent on every submission
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// Whether the provider should generate an audio track
    #[serde(default)]
    pub generate_audio: bool,

    /// Delay between consecutive status polls, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Polling budget for a fresh submission, in milliseconds
    #[serde(default = "default_submit_wait_ms")]
    pub submit_wait_ms: u64,

    /// Polling budget for a resume request, in milliseconds
    #[serde(default = "default_resume_wait_ms")]
    pub resume_wait_ms: u64,

    /// Provider statuses that mean "still working" (comma-separated)
    #[serde(default = "default_processing_statuses")]
    pub processing_statuses: Vec<String>,

    /// Provider statuses that mean the job is dead (comma-separated)
    #[serde(default = "default_failure_statuses")]
    pub failure_statuses: Vec<String>,

    /// Free-tier chat backend (OpenAI-compatible)
    pub chat_free_api_base: String,
    pub chat_free_api_key: String,
    #[serde(default = "default_chat_free_model")]
    pub chat_free_model: String,

    /// Premium-tier chat backend (OpenAI-compatible)
    pub chat_premium_api_base: String,
    pub chat_premium_api_key: String,
    #[serde(default = "default_chat_premium_model")]
    pub chat_premium_model: String,

    /// Shared secret the front-end must present on /api/v1/notify
    pub push_shared_secret: String,

    /// Push dispatch endpoint and its API token
    pub push_api_url: String,
    pub push_api_key: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_video_model() -> String {
    "i2v-turbo-v2".to_string()
}

fn default_prompt() -> String {
    "Animate this image with smooth, natural motion".to_string()
}

fn default_resolution() -> String {
    "480p".to_string()
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_submit_wait_ms() -> u64 {
    50_000
}

fn default_resume_wait_ms() -> u64 {
    15_000
}

fn default_processing_statuses() -> Vec<String> {
    [
        "queued",
        "pending",
        "starting",
        "running",
        "in-progress",
        "in_progress",
        "processing",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_failure_statuses() -> Vec<String> {
    ["failed", "error", "cancelled", "canceled"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_chat_free_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_chat_premium_model() -> String {
    "gpt-4o".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Fallbacks applied during submission. Passed into the submission path
    /// explicitly so tests can vary them without touching process state.
    pub fn generation_defaults(&self) -> GenerationDefaults {
        GenerationDefaults {
            prompt: self.default_prompt.clone(),
            resolution: Resolution::from_loose(Some(&self.default_resolution)),
            aspect_ratio: self.aspect_ratio.clone(),
            audio: self.generate_audio,
        }
    }

    pub fn submit_plan(&self) -> PollPlan {
        PollPlan {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_wait: Duration::from_millis(self.submit_wait_ms),
        }
    }

    pub fn resume_plan(&self) -> PollPlan {
        PollPlan {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_wait: Duration::from_millis(self.resume_wait_ms),
        }
    }

    pub fn status_vocabulary(&self) -> StatusVocabulary {
        StatusVocabulary::new(&self.processing_statuses, &self.failure_statuses)
    }
}

/// Fallback values folded into every submission.
#[derive(Debug, Clone)]
pub struct GenerationDefaults {
    pub prompt: String,
    pub resolution: Resolution,
    pub aspect_ratio: String,
    pub audio: bool,
}

/// Time budget for one bounded polling pass.
#[derive(Debug, Clone, Copy)]
pub struct PollPlan {
    pub interval: Duration,
    pub max_wait: Duration,
}

/// The provider reports job state as free-text strings. This vocabulary is the
/// single place that text is matched; anything outside both sets is treated as
/// a contract violation by the classifier.
#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    processing: Vec<String>,
    failed: Vec<String>,
}

impl StatusVocabulary {
    pub fn new(processing: &[String], failed: &[String]) -> Self {
        let normalize = |list: &[String]| {
            list.iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            processing: normalize(processing),
            failed: normalize(failed),
        }
    }

    pub fn is_processing(&self, status: &str) -> bool {
        self.processing.iter().any(|s| s == &status.trim().to_ascii_lowercase())
    }

    pub fn is_failure(&self, status: &str) -> bool {
        self.failed.iter().any(|s| s == &status.trim().to_ascii_lowercase())
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::new(&default_processing_statuses(), &default_failure_statuses())
    }
}
