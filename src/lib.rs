// src/lib.rs
// Dynamic persona: context-aware persona regeneration for LLM requests

pub mod config;
pub mod error;
pub mod hooks;
pub mod llm;
pub mod logging;
pub mod persona;
pub mod utils;

pub use config::{AppConfig, PersonaConfig};
pub use error::{PersonaError, Result};
pub use hooks::{HookPipeline, LlmRequestHook, ProviderRequest};
pub use llm::{LlmClient, ProviderFactory, ProviderRegistry};
pub use persona::{InjectionOutcome, PersonaInjector, SessionCounters};

use std::sync::Arc;

/// Build the persona hook from loaded config: providers from `[[providers]]`,
/// trigger options from `[persona]` plus environment overrides.
pub fn build_injector(config: &AppConfig) -> PersonaInjector {
    let registry = ProviderFactory::from_config(&config.file);
    if !registry.has_providers() {
        tracing::warn!("No LLM providers configured, persona generation will be skipped");
    }
    PersonaInjector::new(config.persona.clone(), Arc::new(registry))
}
