use reqwest::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;

/// Failures of a single completion call.
#[derive(Debug, ThisError)]
pub enum LlmError {
    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    ///
    /// `message` is the provider's own error message when the body was the standard error
    /// envelope; `body` keeps a bounded preview for diagnostics.
    #[error("Upstream error with status {status}: {}", upstream_detail(.message, .body))]
    UpstreamStatus {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },

    #[error("Failed to decode completion payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// No choices, or the first choice carried no text.
    #[error("Completion contained no content")]
    EmptyCompletion,

    #[error("Invalid provider url: {0}")]
    Url(#[from] url::ParseError),
}

fn upstream_detail<'a>(message: &'a Option<String>, body: &'a str) -> &'a str {
    message.as_deref().unwrap_or(body)
}

impl IsRetryable for LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Reqwest(err) => !err.is_builder() && !err.is_decode(),
            LlmError::UpstreamStatus { status, .. } => {
                status.is_server_error()
                    || matches!(
                        *status,
                        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT
                    )
            }
            LlmError::Decode(_) | LlmError::EmptyCompletion | LlmError::Url(_) => false,
        }
    }
}
