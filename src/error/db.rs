use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A statement inside `run_in_transaction` failed; the transaction was rolled back.
    #[error("Statement {} of the transaction failed: {source}", .index + 1)]
    Statement {
        index: usize,
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}
