pub mod agents;
pub mod cli;
pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod llm;
pub mod repl;
pub mod server;
pub mod utils;
pub mod workflow;

pub use agents::AgentSystem;
pub use config::Config;
pub use db::Database;
pub use error::{AgentError, ApiError};
pub use llm::{CompletionClient, OpenAiClient};
