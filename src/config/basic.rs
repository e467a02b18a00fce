use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Env: `PORT`. Default: `3000`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Path of the single SQLite file the agents build and query.
    /// TOML: `basic.database_path`. Env: `DATABASE_PATH`. Default: `database.sqlite`.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// How long SQLite waits on a locked database file before failing.
    /// TOML: `basic.db_busy_timeout_ms`. Default: `5000`.
    #[serde(default = "default_db_busy_timeout_ms")]
    pub db_busy_timeout_ms: u64,

    /// Upper bound for a single executor call (open, run, close).
    /// TOML: `basic.db_timeout_secs`. Default: `30`.
    #[serde(default = "default_db_timeout_secs")]
    pub db_timeout_secs: u64,
}

impl BasicConfig {
    pub fn db_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }

    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_secs.max(1))
    }
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_path: default_database_path(),
            loglevel: default_loglevel(),
            db_busy_timeout_ms: default_db_busy_timeout_ms(),
            db_timeout_secs: default_db_timeout_secs(),
        }
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    3000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.sqlite")
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_db_busy_timeout_ms() -> u64 {
    5000
}

fn default_db_timeout_secs() -> u64 {
    30
}
