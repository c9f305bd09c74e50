use std::time::Instant;

use tokio::time::sleep;
use tracing::debug;

use crate::config::{PollPlan, StatusVocabulary};
use crate::services::video::{ProviderReply, VideoClient, VideoError};

/// Everything a bounded polling pass can end with.
///
/// The provider's free-text status strings are classified exactly once, into
/// this union; nothing downstream looks at the raw vocabulary again.
pub enum PollOutcome {
    /// Budget elapsed while the provider still reported progress. The job is
    /// alive upstream; the caller resumes with the same queue id.
    StillProcessing { queue_id: String, polls: u32 },
    /// Terminal success signaled as JSON carrying a direct result reference.
    SuccessUrl(serde_json::Value),
    /// Terminal success signaled as the binary artifact itself.
    SuccessBinary {
        media_type: String,
        response: reqwest::Response,
    },
    /// Terminal failure reported by the provider; payload kept for diagnostics.
    Failure(serde_json::Value),
    /// JSON reply whose status is outside both known vocabularies and which
    /// carries no result reference.
    ContractViolation { payload: serde_json::Value },
}

/// Classification of a single JSON status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Processing,
    Failed,
    ResultReady,
    Unrecognized,
}

/// Map one raw provider JSON document into a [`StatusClass`].
///
/// A direct result URL wins over whatever the status string says; an unknown
/// status with no result reference is conservatively unrecognized rather than
/// retried forever.
pub fn classify_status(vocab: &StatusVocabulary, payload: &serde_json::Value) -> StatusClass {
    let has_result_url = ["video_url", "url"].iter().any(|key| {
        payload
            .get(key)
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.is_empty())
    });
    if has_result_url {
        return StatusClass::ResultReady;
    }

    match payload.get("status").and_then(|v| v.as_str()) {
        Some(status) if vocab.is_processing(status) => StatusClass::Processing,
        Some(status) if vocab.is_failure(status) => StatusClass::Failed,
        _ => StatusClass::Unrecognized,
    }
}

/// Poll a job until it settles or the time budget runs out.
///
/// Polls are strictly sequential: each round-trip completes before the loop
/// sleeps for the configured interval and tries again. The only retried
/// condition is an explicit processing status; provider-side HTTP failures
/// propagate immediately as [`VideoError`].
pub async fn poll_until_settled(
    client: &VideoClient,
    vocab: &StatusVocabulary,
    queue_id: &str,
    plan: &PollPlan,
) -> Result<PollOutcome, VideoError> {
    let started = Instant::now();
    let mut polls: u32 = 0;

    loop {
        let reply = client.fetch(queue_id).await?;
        polls += 1;
        metrics::counter!("generation_polls_total").increment(1);

        match reply {
            ProviderReply::Binary {
                media_type,
                response,
            } => {
                debug!(queue_id = %queue_id, polls, media_type = %media_type, "job settled with binary artifact");
                return Ok(PollOutcome::SuccessBinary {
                    media_type,
                    response,
                });
            }
            ProviderReply::Json(payload) => match classify_status(vocab, &payload) {
                StatusClass::ResultReady => {
                    debug!(queue_id = %queue_id, polls, "job settled with result reference");
                    return Ok(PollOutcome::SuccessUrl(payload));
                }
                StatusClass::Failed => {
                    return Ok(PollOutcome::Failure(payload));
                }
                StatusClass::Unrecognized => {
                    return Ok(PollOutcome::ContractViolation { payload });
                }
                StatusClass::Processing => {
                    // Stop before a sleep that would overrun the budget; the
                    // caller gets the queue id back and resumes later.
                    if started.elapsed() + plan.interval >= plan.max_wait {
                        debug!(queue_id = %queue_id, polls, "budget exhausted, job still processing");
                        return Ok(PollOutcome::StillProcessing {
                            queue_id: queue_id.to_string(),
                            polls,
                        });
                    }
                    sleep(plan.interval).await;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vocab() -> StatusVocabulary {
        StatusVocabulary::default()
    }

    #[test]
    fn processing_statuses_classify_as_processing() {
        for status in ["queued", "pending", "starting", "running", "in-progress", "processing"] {
            let payload = json!({ "status": status });
            assert_eq!(classify_status(&vocab(), &payload), StatusClass::Processing);
        }
    }

    #[test]
    fn failure_statuses_classify_as_failed() {
        for status in ["failed", "error", "cancelled"] {
            let payload = json!({ "status": status });
            assert_eq!(classify_status(&vocab(), &payload), StatusClass::Failed);
        }
    }

    #[test]
    fn result_url_wins_regardless_of_status() {
        let payload = json!({ "status": "processing", "video_url": "https://cdn.example/clip.mp4" });
        assert_eq!(classify_status(&vocab(), &payload), StatusClass::ResultReady);

        let payload = json!({ "url": "https://cdn.example/clip.mp4" });
        assert_eq!(classify_status(&vocab(), &payload), StatusClass::ResultReady);
    }

    #[test]
    fn empty_result_url_does_not_count() {
        let payload = json!({ "status": "queued", "video_url": "" });
        assert_eq!(classify_status(&vocab(), &payload), StatusClass::Processing);
    }

    #[test]
    fn unknown_status_is_unrecognized() {
        for payload in [
            json!({ "status": "transcoding" }),
            json!({ "status": 42 }),
            json!({ "progress": 0.5 }),
            json!({}),
        ] {
            assert_eq!(classify_status(&vocab(), &payload), StatusClass::Unrecognized);
        }
    }

    #[test]
    fn custom_vocabulary_extends_classification() {
        let vocab = StatusVocabulary::new(
            &["transcoding".to_string()],
            &["nsfw_rejected".to_string()],
        );
        assert_eq!(
            classify_status(&vocab, &json!({ "status": "transcoding" })),
            StatusClass::Processing
        );
        assert_eq!(
            classify_status(&vocab, &json!({ "status": "NSFW_REJECTED" })),
            StatusClass::Failed
        );
    }
}
