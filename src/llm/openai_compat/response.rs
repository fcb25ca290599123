// src/llm/openai_compat/response.rs
// OpenAI-compatible chat response parsing

use crate::llm::CompletionResponse;
use anyhow::{Result, anyhow};
use serde::Deserialize;

/// Token usage reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Non-streaming chat response (OpenAI-compatible format)
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ResponseChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Parse an OpenAI-compatible chat response into a CompletionResponse.
/// A response with no choices or null content yields empty completion text.
pub fn parse_chat_response(
    response_body: &str,
    request_id: &str,
    duration_ms: u64,
) -> Result<CompletionResponse> {
    let data: ChatResponse = serde_json::from_str(response_body)
        .map_err(|e| anyhow!("Failed to parse chat response: {}", e))?;

    let completion_text = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    Ok(CompletionResponse {
        request_id: request_id.to_owned(),
        completion_text,
        usage: data.usage,
        duration_ms,
    })
}
