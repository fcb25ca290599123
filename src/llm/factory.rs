// src/llm/factory.rs
// Provider registry: named LLM clients plus an active default

use crate::config::{FileConfig, ProviderSpec};
use crate::llm::openai_compat::OpenAiCompatClient;
use crate::llm::provider::{LlmClient, ProviderRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of LLM clients keyed by provider id
#[derive(Default)]
pub struct ProviderFactory {
    clients: HashMap<String, Arc<dyn LlmClient>>,
    // Registration order doubles as the fallback chain for the default
    order: Vec<String>,
    default_id: Option<String>,
}

impl ProviderFactory {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build clients from `[[providers]]` entries.
    ///
    /// Entries whose `api_key_env` variable is unset, or whose base URL is
    /// invalid, are skipped with a warning.
    pub fn from_config(config: &FileConfig) -> Self {
        Self::from_specs(
            &config.providers,
            config.llm.default_provider.clone(),
            |name| std::env::var(name).ok(),
        )
    }

    /// Same as [`from_config`](Self::from_config) with an explicit env lookup
    pub fn from_specs<F>(specs: &[ProviderSpec], default_id: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut factory = Self::new();

        for spec in specs {
            let api_key = match spec.api_key_env.as_deref() {
                Some(var) => match lookup(var).filter(|k| !k.trim().is_empty()) {
                    Some(key) => Some(key),
                    None => {
                        warn!(provider = %spec.id, env = %var, "API key not set, skipping provider");
                        continue;
                    }
                },
                None => None,
            };

            match OpenAiCompatClient::from_spec(spec, api_key) {
                Ok(client) => {
                    info!(provider = %spec.id, model = %spec.model, "LLM client initialized");
                    factory.register(spec.id.clone(), Arc::new(client));
                }
                Err(e) => warn!(provider = %spec.id, error = %e, "Skipping provider"),
            }
        }

        if let Some(id) = default_id.filter(|s| !s.trim().is_empty()) {
            factory.set_default(id);
        }

        info!(providers = ?factory.order, "LLM providers available");
        factory
    }

    /// Register (or replace) a client under an id
    pub fn register(&mut self, id: impl Into<String>, client: Arc<dyn LlmClient>) {
        let id = id.into();
        if self.clients.insert(id.clone(), client).is_none() {
            self.order.push(id);
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_client(mut self, id: impl Into<String>, client: Arc<dyn LlmClient>) -> Self {
        self.register(id, client);
        self
    }

    /// Mark a provider id as the active default
    pub fn set_default(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.clients.contains_key(&id) {
            warn!(provider = %id, "Default provider is not registered");
        }
        self.default_id = Some(id);
    }

    pub fn with_default(mut self, id: impl Into<String>) -> Self {
        self.set_default(id);
        self
    }

    /// List registered provider ids in registration order
    pub fn available_providers(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn is_available(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    pub fn has_providers(&self) -> bool {
        !self.clients.is_empty()
    }

    pub fn default_id(&self) -> Option<&str> {
        self.default_id.as_deref()
    }
}

impl ProviderRegistry for ProviderFactory {
    fn provider_by_id(&self, id: &str) -> Option<Arc<dyn LlmClient>> {
        self.clients.get(id).cloned()
    }

    /// Priority: configured default -> first registered client
    fn default_provider(&self) -> Option<Arc<dyn LlmClient>> {
        if let Some(ref id) = self.default_id {
            if let Some(client) = self.clients.get(id) {
                return Some(client.clone());
            }
        }

        self.order
            .iter()
            .find_map(|id| self.clients.get(id))
            .cloned()
    }
}
