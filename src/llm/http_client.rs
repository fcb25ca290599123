// src/llm/http_client.rs
// HTTP transport for OpenAI-compatible providers (single attempt, no retry)

use anyhow::{Result, anyhow};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default request timeout for completion calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Timeouts applied to every call made through one [`LlmHttpClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl HttpTimeouts {
    /// Request timeout of `secs`; connect timeout capped by it
    pub fn from_request_secs(secs: u64) -> Self {
        let request = Duration::from_secs(secs.max(1));
        Self {
            request,
            connect: request.min(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
        }
    }
}

pub struct LlmHttpClient {
    client: Client,
    timeouts: HttpTimeouts,
}

impl LlmHttpClient {
    pub fn new(timeouts: HttpTimeouts) -> Self {
        let client = match Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                debug!(error = %e, "Falling back to default HTTP client");
                Client::new()
            }
        };
        Self { client, timeouts }
    }

    pub fn timeouts(&self) -> HttpTimeouts {
        self.timeouts
    }

    /// POST `body` as JSON once and return the response text.
    ///
    /// Non-2xx statuses, connect failures and timeouts all come back as
    /// errors; the caller decides what a failure means.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        request_id: &str,
        url: &str,
        api_key: Option<&str>,
        body: &T,
    ) -> Result<String> {
        let mut builder = self.client.post(url).json(body);
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(request_id = %request_id, url = %url, "Sending completion request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request timed out after {:?}: {}", self.timeouts.request, e)
            } else {
                anyhow!("Request failed: {}", e)
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!("API error {}: {}", status, text));
        }
        Ok(text)
    }
}

impl Default for LlmHttpClient {
    fn default() -> Self {
        Self::new(HttpTimeouts::default())
    }
}
