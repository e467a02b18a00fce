//! OpenAI Chat Completions request schema.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/chat/completions`.
///
/// Schema reference:
/// https://platform.openai.com/docs/api-reference/chat/create
///
/// Only the fields the agents send are modelled; the provider applies its own defaults to
/// everything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// OpenAI docs: `string`, required.
    pub model: String,

    /// OpenAI docs: `array`, required.
    pub messages: Vec<ChatMessage>,

    /// OpenAI docs: `number`, optional, default `1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// Builds the two-message (system, user) request used by every agent.
    pub fn system_user(
        model: impl Into<String>,
        temperature: f32,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            temperature: Some(temperature),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}
