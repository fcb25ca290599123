// src/llm/mod.rs
// LLM clients and the provider registry used for persona generation

mod factory;
mod http_client;
mod openai_compat;
mod provider;

pub use factory::ProviderFactory;
pub use http_client::{HttpTimeouts, LlmHttpClient};
pub use openai_compat::{OpenAiCompatClient, Usage};
pub use provider::{CompletionRequest, CompletionResponse, LlmClient, Message, ProviderRegistry};
