// src/llm/provider.rs
// LLM provider abstraction layer: clients, registry, request envelope

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::Usage;

/// A single chat message (OpenAI-style role/content pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// Text completion request: prompt, prior conversation, system instruction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub history: Vec<Message>,
    pub system_prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Persona generation envelope: the instruction lives inside the prompt,
    /// so history and system instruction are both empty.
    pub fn persona(prompt: impl Into<String>) -> Self {
        Self::new(prompt)
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Flatten into the message list sent over the wire.
    /// An empty system instruction is omitted rather than sent blank.
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(self.prompt.clone()));
        messages
    }
}

/// Result of a completion call
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    pub request_id: String,
    pub completion_text: String,
    pub usage: Option<Usage>,
    pub duration_ms: u64,
}

impl CompletionResponse {
    pub fn text(completion_text: impl Into<String>) -> Self {
        Self {
            completion_text: completion_text.into(),
            ..Default::default()
        }
    }
}

/// Trait for LLM clients - all providers must implement this
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Registry id of this provider
    fn provider_id(&self) -> String;

    /// Model name used by this client
    fn model_name(&self) -> String;
}

/// Lookup of LLM clients owned by the host
pub trait ProviderRegistry: Send + Sync {
    /// Resolve a specific provider by its configured id
    fn provider_by_id(&self, id: &str) -> Option<Arc<dyn LlmClient>>;

    /// The currently active default provider
    fn default_provider(&self) -> Option<Arc<dyn LlmClient>>;
}
