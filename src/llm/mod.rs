//! Completion client: one system+user prompt pair in, the provider's text reply out.

mod api;
mod client;

pub use api::ChatApi;
pub use client::OpenAiClient;

use crate::error::LlmError;
use async_trait::async_trait;

/// Bytes of an upstream error body kept for logs and error messages.
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

/// Seam between the agents and the hosted model.
///
/// Agents hold an `Arc<dyn CompletionClient>`; tests substitute scripted replies.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}
