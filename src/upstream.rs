//! Outbound calls to the generative-language API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};

use crate::error::{ConfigError, UpstreamError};
use crate::metrics::{UPSTREAM_FAILURES, UPSTREAM_LATENCY};
use crate::models::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Something that can answer a question.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn generate(&self, question: &str) -> Result<GenerateContentResponse, UpstreamError>;
}

#[derive(Debug)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub generation_config: Option<GenerationConfig>,
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    // without the key, safe to log
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn call(&self, question: &str) -> Result<GenerateContentResponse, UpstreamError> {
        let body = GenerateContentRequest::from_question(question, self.config.generation_config);
        let url = self.endpoint();

        tracing::debug!(url = %url, prompt_len = question.len(), "Sending request to Gemini API");

        let keyed = Url::parse_with_params(&url, [("key", self.config.api_key.expose_secret())])
            .map_err(|e| UpstreamError::Network(format!("invalid upstream url {url}: {e}")))?;

        let response = self
            .client
            .post(keyed)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %detail, "Gemini API returned an error");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Upstream for GeminiClient {
    async fn generate(&self, question: &str) -> Result<GenerateContentResponse, UpstreamError> {
        let start_time = Instant::now();
        let result = self.call(question).await;
        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

        if let Err(e) = &result {
            UPSTREAM_FAILURES.inc();
            tracing::warn!(error = %e, model = %self.config.model, "Gemini call failed");
        }
        result
    }
}
