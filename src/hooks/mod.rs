//! Pre-request hooks for the host's LLM pipeline
//!
//! The host owns a [`HookPipeline`] and calls [`HookPipeline::dispatch`]
//! right before each outbound LLM request. Hooks may rewrite the request in
//! place; they never fail the request.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::llm::Message;

/// Registered plugin name
pub const PLUGIN_NAME: &str = "dynamic_persona";
/// One-line description shown by hosts that list plugins
pub const PLUGIN_DESCRIPTION: &str =
    "Regenerates a short persona every N requests and prepends it to the system prompt";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Priority of the persona hook (higher runs earlier)
pub const PERSONA_HOOK_PRIORITY: i32 = 100;

/// Outbound LLM request as seen by hooks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRequest {
    /// Latest user message
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Prior conversation
    pub contexts: Vec<Message>,
    pub image_urls: Vec<String>,
}

impl ProviderRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<Message>) -> Self {
        self.contexts = contexts;
        self
    }

    /// System prompt with absent treated as empty
    pub fn system_prompt_or_empty(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or("")
    }
}

/// A callback run before every outbound LLM request
#[async_trait]
pub trait LlmRequestHook: Send + Sync {
    fn name(&self) -> &str;

    /// Ordering among hooks; higher runs earlier
    fn priority(&self) -> i32 {
        0
    }

    /// Inspect and optionally rewrite the request. Must not fail.
    async fn on_llm_request(&self, session_id: &str, request: &mut ProviderRequest);

    /// Release state on unload. Must be safe to call repeatedly.
    fn terminate(&self) {}
}

/// Priority-ordered set of request hooks
#[derive(Default)]
pub struct HookPipeline {
    hooks: Vec<Arc<dyn LlmRequestHook>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook; equal priorities keep registration order
    pub fn register(&mut self, hook: Arc<dyn LlmRequestHook>) {
        info!(hook = hook.name(), priority = hook.priority(), "Registered LLM request hook");
        self.hooks.push(hook);
        // sort_by_key is stable
        self.hooks.sort_by_key(|h| std::cmp::Reverse(h.priority()));
    }

    pub fn with_hook(mut self, hook: Arc<dyn LlmRequestHook>) -> Self {
        self.register(hook);
        self
    }

    /// Hook names in dispatch order
    pub fn hook_names(&self) -> Vec<String> {
        self.hooks.iter().map(|h| h.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook against the request, highest priority first
    pub async fn dispatch(&self, session_id: &str, request: &mut ProviderRequest) {
        for hook in &self.hooks {
            debug!(hook = hook.name(), session_id = %session_id, "Running LLM request hook");
            hook.on_llm_request(session_id, request).await;
        }
    }

    pub fn terminate(&self) {
        for hook in &self.hooks {
            hook.terminate();
        }
    }
}
