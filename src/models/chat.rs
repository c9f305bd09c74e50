use garde::Validate;
use serde::{Deserialize, Serialize};

/// Inbound body for POST /api/v1/chat.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[garde(length(min = 1, max = 64), dive)]
    pub messages: Vec<ChatMessage>,

    /// Selects the premium chat backend when set.
    #[garde(skip)]
    #[serde(default)]
    pub premium: bool,

    #[garde(dive)]
    pub persona: Option<Persona>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatMessage {
    #[garde(skip)]
    pub role: ChatRole,

    #[garde(length(min = 1, max = 32_000))]
    pub content: String,
}

/// Only these roles are accepted; anything else fails deserialization and
/// never reaches the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Optional character description folded into a leading system message.
#[derive(Debug, Deserialize, Validate)]
pub struct Persona {
    #[garde(length(min = 1, max = 200))]
    pub name: String,

    #[garde(length(max = 2000))]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}
