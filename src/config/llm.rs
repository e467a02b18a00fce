use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

/// Value shipped in `.env.example`; treated the same as an empty key.
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.openai.com/v1/").expect("default OpenAI base url is valid")
});

/// Language-model provider configuration managed by Figment.
#[derive(Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider credential. Requests are refused until this is set.
    /// TOML: `llm.api_key`. Env: `OPENAI_API_KEY`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub api_key: String,

    /// Chat model identifier.
    /// TOML: `llm.model`. Default: `gpt-4-turbo`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature sent with every completion.
    /// TOML: `llm.temperature`. Default: `0.2`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// API root; `chat/completions` is resolved against it, so keep the trailing slash.
    /// TOML: `llm.base_url`. Default: `https://api.openai.com/v1/`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `llm.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for the reqwest client; disabled forces HTTP/1.
    /// TOML: `llm.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// Max retry attempts for a failed completion call; `0` disables retries.
    /// TOML: `llm.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// TOML: `llm.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Total time allowed for one completion request, body included.
    /// TOML: `llm.request_timeout_secs`. Default: `120`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    /// False when the key is unset, blank, or still the placeholder value.
    pub fn credential_configured(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Endpoint for chat completions derived from `base_url`.
    pub fn chat_completions_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join("chat/completions")
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            proxy: None,
            enable_multiplexing: false,
            retry_max_times: default_retry_max_times(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Keeps the credential out of startup logs and panic messages.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url.as_str())
            .field("proxy", &self.proxy.as_ref().map(Url::as_str))
            .field("enable_multiplexing", &self.enable_multiplexing)
            .field("retry_max_times", &self.retry_max_times)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for llm.api_key",
        )),
    }
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_base_url() -> Url {
    DEFAULT_BASE_URL.clone()
}

fn default_retry_max_times() -> usize {
    2
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}
