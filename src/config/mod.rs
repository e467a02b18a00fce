mod basic;
mod llm;

pub use basic::BasicConfig;
pub use llm::{LlmConfig, PLACEHOLDER_API_KEY};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Server and storage settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Language-model provider settings (see `llm` table in config.toml).
    #[serde(default)]
    pub llm: LlmConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Plain variables understood for compatibility with `.env` files of the form
/// `OPENAI_API_KEY=...`, `PORT=...`, `DATABASE_PATH=...`.
const PLAIN_ENV_KEYS: [(&str, &str); 3] = [
    ("OPENAI_API_KEY", "llm.api_key"),
    ("PORT", "basic.listen_port"),
    ("DATABASE_PATH", "basic.database_path"),
];

impl Config {
    /// Builds a Figment that merges, in order of precedence (lowest first):
    /// defaults, `config.toml` (if present), plain env vars, `DBAGENT_*` env vars.
    pub fn figment() -> Figment {
        Self::figment_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn figment_from(config_file: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(config_file).is_file() {
            figment = figment.merge(Toml::file(config_file));
        }
        figment
            .merge(Env::raw().only(&PLAIN_ENV_KEYS.map(|(var, _)| var)).map(|key| {
                PLAIN_ENV_KEYS
                    .iter()
                    .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                    .map_or_else(|| key.as_str().to_string(), |(_, path)| (*path).to_string())
                    .into()
            }))
            .merge(Env::prefixed("DBAGENT_").split("__"))
    }

    /// Loads configuration from defaults, `config.toml` and the environment.
    ///
    /// A missing provider credential is not an error here: the HTTP surface still starts and
    /// answers every route with a configuration error (see `LlmConfig::credential_configured`).
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
