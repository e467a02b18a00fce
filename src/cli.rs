use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dbagent")]
#[command(about = "Design, build and query a SQLite database with language-model agents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(long, global = true, env = "DBAGENT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (default)
    #[default]
    Serve,

    /// Interactive numbered menu on stdin/stdout
    Repl,

    /// Run the bundled e-commerce example through the full workflow
    Example,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or_default()
    }
}
