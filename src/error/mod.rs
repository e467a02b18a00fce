mod agent;
mod api;
mod db;
mod llm;

pub use agent::AgentError;
pub use api::{ApiError, ApiErrorBody, ApiErrorObject};
pub use db::DbError;
pub use llm::LlmError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
