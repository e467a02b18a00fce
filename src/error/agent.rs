use thiserror::Error as ThisError;

use super::{DbError, LlmError};

/// Errors the agents pass up unchanged instead of folding into an outcome object.
#[derive(Debug, ThisError)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Database(#[from] DbError),
}
