use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use dbagent_schema::ChatCompletionRequest;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::{ChatApi, CompletionClient};
use crate::config::LlmConfig;
use crate::error::{IsRetryable, LlmError};
use crate::utils::logging::with_pretty_json_debug;

const USER_AGENT: &str = concat!("dbagent/", env!("CARGO_PKG_VERSION"));

/// Chat-completions client for OpenAI-compatible providers.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    completions_url: Url,
    api_key: Arc<str>,
    model: String,
    temperature: f32,
    retry_policy: ExponentialBuilder,
}

impl OpenAiClient {
    pub fn new(cfg: &LlmConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout());

        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        if cfg.enable_multiplexing {
            builder = builder.http2_adaptive_window(true);
        } else {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));

            builder = builder
                .http1_only()
                .pool_max_idle_per_host(0)
                .pool_idle_timeout(Duration::from_secs(0));
        }

        let client = builder.default_headers(headers).build()?;

        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(8))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();

        Ok(Self {
            client,
            completions_url: cfg.chat_completions_url()?,
            api_key: Arc::from(cfg.api_key.trim()),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            retry_policy,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_once(&self, body: &ChatCompletionRequest) -> Result<String, LlmError> {
        let start = Instant::now();
        let req = ChatApi::build_chat_request(
            &self.client,
            &self.completions_url,
            &self.api_key,
            body,
        )?;
        let resp = self.client.execute(req).await?;
        let status = resp.status();
        let text = ChatApi::read_completion(resp).await?;

        info!(
            channel = "llm",
            req.model = %self.model,
            %status,
            reply_chars = text.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "[LLM] Completion received"
        );
        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let body = ChatCompletionRequest::system_user(
            self.model.as_str(),
            self.temperature,
            system_prompt,
            user_prompt,
        );

        with_pretty_json_debug(&body, |pretty_body| {
            debug!(
                channel = "llm",
                url = %self.completions_url,
                body = %pretty_body,
                "[LLM] Outgoing completion request"
            );
        });

        (|| self.complete_once(&body))
            .retry(self.retry_policy)
            .when(|err: &LlmError| err.is_retryable())
            .notify(|err: &LlmError, dur: Duration| {
                warn!(channel = "llm", error = %err, "[LLM] Retrying completion in {:?}", dur);
            })
            .await
    }
}
