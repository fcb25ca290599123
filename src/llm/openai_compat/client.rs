// src/llm/openai_compat/client.rs
// Client for any OpenAI-compatible /v1/chat/completions endpoint

use crate::config::ProviderSpec;
use crate::error::PersonaError;
use crate::llm::http_client::{HttpTimeouts, LlmHttpClient};
use crate::llm::provider::LlmClient;
use crate::llm::{CompletionRequest, CompletionResponse};
use anyhow::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use super::{ChatRequest, parse_chat_response};

/// Normalize a base URL by stripping trailing slashes and a /v1 suffix
fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim_end_matches('/').to_string();
    if url.ends_with("/v1") {
        url.truncate(url.len() - 3);
    }
    url
}

/// OpenAI-compatible chat client (DeepSeek, OpenAI, Ollama, vLLM, ...)
pub struct OpenAiCompatClient {
    id: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    http: LlmHttpClient,
}

impl OpenAiCompatClient {
    /// Create a client with the default request timeout
    pub fn new(
        id: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: normalize_base_url(base_url),
            model: model.into(),
            api_key,
            max_tokens: None,
            temperature: None,
            http: LlmHttpClient::default(),
        }
    }

    /// Build a client from a `[[providers]]` config entry
    pub fn from_spec(spec: &ProviderSpec, api_key: Option<String>) -> crate::error::Result<Self> {
        url::Url::parse(&spec.base_url).map_err(|e| {
            PersonaError::Config(format!(
                "provider '{}' has invalid base_url '{}': {}",
                spec.id, spec.base_url, e
            ))
        })?;

        let mut client = Self::new(spec.id.clone(), &spec.base_url, spec.model.clone(), api_key);
        client.max_tokens = spec.max_tokens;
        client.temperature = spec.temperature;
        if let Some(secs) = spec.timeout_secs {
            client.http = LlmHttpClient::new(HttpTimeouts::from_request_secs(secs));
        }
        Ok(client)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        self.http.timeouts().request
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    #[instrument(skip(self, request), fields(provider = %self.id, model = %self.model, history = request.history.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let body = ChatRequest::new(self.model.clone(), request.to_messages())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let start = Instant::now();
        let raw = self
            .http
            .post_json(&request_id, &self.endpoint(), self.api_key.as_deref(), &body)
            .await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let response = parse_chat_response(&raw, &request_id, duration_ms)?;
        info!(
            request_id = %request_id,
            duration_ms = duration_ms,
            content_len = response.completion_text.len(),
            "{} completion done", self.id
        );
        if let Some(ref u) = response.usage {
            info!(
                request_id = %request_id,
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "{} usage stats", self.id
            );
        }
        Ok(response)
    }

    fn provider_id(&self) -> String {
        self.id.clone()
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
