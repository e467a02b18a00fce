use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;

use super::{AgentError, DbError, LlmError};

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, ThisError)]
pub enum ApiError {
    /// The provider credential is unset or still the placeholder.
    #[error("OpenAI API key not configured. Please set your API key in the .env file.")]
    ProviderNotConfigured,

    /// A required body field was absent or empty; the message is shown to the caller.
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        ApiError::Agent(AgentError::Llm(err))
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Agent(AgentError::Database(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match &self {
            ApiError::ProviderNotConfigured => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_NOT_CONFIGURED")
            }
            ApiError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            ApiError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Agent(AgentError::Llm(_)) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Agent(AgentError::Database(DbError::Timeout(_))) => {
                (StatusCode::GATEWAY_TIMEOUT, "DATABASE_TIMEOUT")
            }
            ApiError::Agent(AgentError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
        };

        if status.is_server_error() {
            tracing::error!(%status, code, error = %message, "Request failed");
        } else {
            tracing::warn!(%status, code, error = %message, "Request rejected");
        }

        let body = ApiErrorBody {
            success: false,
            inner: ApiErrorObject {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
