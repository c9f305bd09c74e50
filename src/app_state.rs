use std::sync::Arc;
use std::time::Instant;

use crate::config::{GenerationDefaults, PollPlan, StatusVocabulary};
use crate::services::{chat::ChatClient, push::PushClient, video::VideoClient};

/// Shared application state passed to all route handlers.
///
/// Everything here is immutable after startup; the gateway keeps no mutable
/// state across requests.
#[derive(Clone)]
pub struct AppState {
    pub video: Arc<VideoClient>,
    pub chat: Arc<ChatClient>,
    pub push: Arc<PushClient>,
    pub defaults: Arc<GenerationDefaults>,
    pub vocab: Arc<StatusVocabulary>,
    pub submit_plan: PollPlan,
    pub resume_plan: PollPlan,
    pub push_shared_secret: Arc<String>,
    pub started_at: Instant,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        video: VideoClient,
        chat: ChatClient,
        push: PushClient,
        defaults: GenerationDefaults,
        vocab: StatusVocabulary,
        submit_plan: PollPlan,
        resume_plan: PollPlan,
        push_shared_secret: String,
    ) -> Self {
        Self {
            video: Arc::new(video),
            chat: Arc::new(chat),
            push: Arc::new(push),
            defaults: Arc::new(defaults),
            vocab: Arc::new(vocab),
            submit_plan,
            resume_plan,
            push_shared_secret: Arc::new(push_shared_secret),
            started_at: Instant::now(),
        }
    }
}
