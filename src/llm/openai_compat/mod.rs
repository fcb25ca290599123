// src/llm/openai_compat/mod.rs
// OpenAI-compatible chat completions (DeepSeek, Ollama, vLLM, OpenAI itself)

mod client;
mod request;
mod response;

pub use client::OpenAiCompatClient;
pub use request::ChatRequest;
pub use response::{Usage, parse_chat_response};
