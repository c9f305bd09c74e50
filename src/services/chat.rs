use reqwest::Client;
use serde::Deserialize;

use crate::models::chat::{ChatRequest, ChatResponse};

/// Hard ceilings applied to text folded into the upstream prompt. Anything
/// longer is clamped, not rejected.
const MAX_MESSAGE_CHARS: usize = 4_000;
const MAX_PERSONA_NAME_CHARS: usize = 80;
const MAX_PERSONA_DESCRIPTION_CHARS: usize = 1_200;

/// One OpenAI-compatible chat-completions backend.
pub struct ChatBackend {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatBackend {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

/// Forwards chat requests to one of two backends selected by the caller's
/// payment tier. Pure validate-and-forward; no retry, no streaming.
pub struct ChatClient {
    http: Client,
    free: ChatBackend,
    premium: ChatBackend,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl ChatClient {
    pub fn new(free: ChatBackend, premium: ChatBackend) -> Self {
        Self {
            http: Client::new(),
            free,
            premium,
        }
    }

    pub fn backend_for(&self, premium: bool) -> &ChatBackend {
        if premium {
            &self.premium
        } else {
            &self.free
        }
    }

    pub async fn complete(&self, req: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let backend = self.backend_for(req.premium);
        let url = format!("{}/v1/chat/completions", backend.base_url);

        let request_body = serde_json::json!({
            "model": backend.model,
            "messages": assemble_messages(req),
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&backend.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(ChatError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await.map_err(ChatError::Http)?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(ChatError::EmptyCompletion)?;

        Ok(ChatResponse {
            reply,
            model: backend.model.clone(),
        })
    }
}

/// Build the upstream message list: optional persona as a leading system
/// message, then the caller's messages with content clamped.
pub fn assemble_messages(req: &ChatRequest) -> Vec<serde_json::Value> {
    let mut out = Vec::with_capacity(req.messages.len() + 1);

    if let Some(persona) = &req.persona {
        let name = clamp_chars(&persona.name, MAX_PERSONA_NAME_CHARS);
        let description = clamp_chars(&persona.description, MAX_PERSONA_DESCRIPTION_CHARS);
        out.push(serde_json::json!({
            "role": "system",
            "content": format!("You are {name}. {description}"),
        }));
    }

    for message in &req.messages {
        out.push(serde_json::json!({
            "role": message.role.as_str(),
            "content": clamp_chars(&message.content, MAX_MESSAGE_CHARS),
        }));
    }

    out
}

fn clamp_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP request to chat provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("chat provider returned a completion with no content")]
    EmptyCompletion,
}
