use dbagent_schema::{ChatCompletionRequest, ChatCompletionResponse, OpenaiErrorBody};

use super::UPSTREAM_BODY_PREVIEW_CHARS;
use crate::error::LlmError;
use crate::utils::logging::preview;

pub struct ChatApi;

impl ChatApi {
    pub fn build_chat_request(
        client: &reqwest::Client,
        completions_url: &url::Url,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<reqwest::Request, reqwest::Error> {
        client
            .post(completions_url.clone())
            .bearer_auth(api_key)
            .json(body)
            .build()
    }

    /// Turns a provider response into the text of its first choice.
    ///
    /// Non-success statuses become `LlmError::UpstreamStatus`, carrying the provider's
    /// error message when the body is the standard `{"error": {...}}` envelope.
    pub async fn read_completion(resp: reqwest::Response) -> Result<String, LlmError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<OpenaiErrorBody>(&bytes)
                .ok()
                .map(|body| body.inner.message)
                .filter(|message| !message.is_empty());
            return Err(LlmError::UpstreamStatus {
                status,
                message,
                body: preview(&String::from_utf8_lossy(&bytes), UPSTREAM_BODY_PREVIEW_CHARS),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or(LlmError::EmptyCompletion)
    }
}
