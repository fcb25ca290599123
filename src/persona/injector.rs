// src/persona/injector.rs
// Persona trigger & injector: counts requests per session, regenerates the
// persona every N requests and prepends it to the system prompt.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::context::GenerationContext;
use super::counter::SessionCounters;
use crate::config::PersonaConfig;
use crate::error::{PersonaError, Result};
use crate::hooks::{LlmRequestHook, PERSONA_HOOK_PRIORITY, PLUGIN_NAME, ProviderRequest};
use crate::llm::{CompletionRequest, LlmClient, ProviderRegistry};
use crate::utils::{single_line, truncate};

/// Max chars of a generated persona echoed into the logs
const PERSONA_LOG_CHARS: usize = 120;

/// What happened to one request
#[derive(Debug)]
pub enum InjectionOutcome {
    /// Feature switched off; nothing counted, nothing touched
    Disabled,
    /// Counted, but not a trigger request
    Skipped { count: u64 },
    /// Persona generated and prepended to the system prompt
    Injected { count: u64, persona: String },
    /// Triggered but generation did not produce a usable persona
    Failed { count: u64, error: PersonaError },
}

impl InjectionOutcome {
    pub fn is_injected(&self) -> bool {
        matches!(self, InjectionOutcome::Injected { .. })
    }

    /// Session counter after this request, if it was counted
    pub fn count(&self) -> Option<u64> {
        match self {
            InjectionOutcome::Disabled => None,
            InjectionOutcome::Skipped { count }
            | InjectionOutcome::Injected { count, .. }
            | InjectionOutcome::Failed { count, .. } => Some(*count),
        }
    }
}

/// Logs if a generation call is dropped before it resolves
/// (host-side timeout or task cancellation).
struct InFlight<'a> {
    session_id: &'a str,
    provider: String,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn start(session_id: &'a str, provider: String) -> Self {
        Self {
            session_id,
            provider,
            done: false,
        }
    }

    fn finish(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            error!(
                session_id = %self.session_id,
                provider = %self.provider,
                error = %PersonaError::Cancelled,
                "Persona generation aborted, system prompt left unchanged"
            );
        }
    }
}

pub struct PersonaInjector {
    config: PersonaConfig,
    registry: Arc<dyn ProviderRegistry>,
    counters: Arc<SessionCounters>,
}

impl PersonaInjector {
    pub fn new(config: PersonaConfig, registry: Arc<dyn ProviderRegistry>) -> Self {
        Self::with_counters(config, registry, Arc::new(SessionCounters::new()))
    }

    /// Use an externally owned counter table
    pub fn with_counters(
        config: PersonaConfig,
        registry: Arc<dyn ProviderRegistry>,
        counters: Arc<SessionCounters>,
    ) -> Self {
        info!(
            enabled = config.enabled,
            update_frequency = config.update_frequency,
            include_time = config.include_time,
            provider = ?config.persona_provider_id,
            "Persona injector ready"
        );
        Self {
            config,
            registry,
            counters,
        }
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    /// Requests counted so far for a session
    pub fn session_count(&self, session_id: &str) -> Option<u64> {
        self.counters.get(session_id)
    }

    /// Hook entry point: never fails, never returns anything
    pub async fn on_request(&self, session_id: &str, request: &mut ProviderRequest) {
        self.process(session_id, request).await;
    }

    /// Run the trigger policy for one request and report what happened.
    ///
    /// Only `request.prompt` is read and only `request.system_prompt` is
    /// written, and the latter only when a non-empty persona was generated.
    pub async fn process(&self, session_id: &str, request: &mut ProviderRequest) -> InjectionOutcome {
        if !self.config.enabled {
            return InjectionOutcome::Disabled;
        }

        let count = self.counters.increment(session_id);
        let outcome = if !self.config.is_triggered(count) {
            InjectionOutcome::Skipped { count }
        } else {
            info!(session_id = %session_id, count = count, "Persona update triggered");
            match self.generate(session_id, &request.prompt).await {
                Ok(persona) => {
                    inject(request, &persona);
                    InjectionOutcome::Injected { count, persona }
                }
                Err(error) => InjectionOutcome::Failed { count, error },
            }
        };

        report(session_id, &outcome);
        outcome
    }

    /// Forget all sessions. Idempotent.
    pub fn terminate(&self) {
        let sessions = self.counters.len();
        self.counters.clear();
        info!(sessions = sessions, "Persona injector terminated, session counters cleared");
    }

    async fn generate(&self, session_id: &str, user_message: &str) -> Result<String> {
        let client = self.resolve_provider(session_id)?;

        let context = GenerationContext::capture(user_message, self.config.include_time);
        let prompt = self.config.custom_generation_prompt.render(&context.describe())?;
        debug!(
            session_id = %session_id,
            provider = %client.provider_id(),
            prompt_len = prompt.len(),
            "Requesting persona"
        );

        let in_flight = InFlight::start(session_id, client.provider_id());
        let result = client.complete(CompletionRequest::persona(prompt)).await;
        in_flight.finish();

        let response = result.map_err(PersonaError::Generation)?;
        let persona = single_line(&response.completion_text);
        if persona.is_empty() {
            return Err(PersonaError::EmptyResult);
        }
        Ok(persona)
    }

    /// Configured provider id -> registry default -> NoProvider
    fn resolve_provider(&self, session_id: &str) -> Result<Arc<dyn LlmClient>> {
        if let Some(ref id) = self.config.persona_provider_id {
            if let Some(client) = self.registry.provider_by_id(id) {
                return Ok(client);
            }
            warn!(
                session_id = %session_id,
                provider = %id,
                "Persona provider not found, falling back to default provider"
            );
        }
        self.registry.default_provider().ok_or(PersonaError::NoProvider)
    }
}

/// Prepend the persona to whatever system prompt the request already carries
fn inject(request: &mut ProviderRequest, persona: &str) {
    let composed = format!("{}\n{}", persona, request.system_prompt_or_empty());
    request.system_prompt = Some(composed.trim().to_string());
}

fn report(session_id: &str, outcome: &InjectionOutcome) {
    match outcome {
        InjectionOutcome::Disabled => {}
        InjectionOutcome::Skipped { count } => {
            debug!(session_id = %session_id, count = *count, "Persona update not due");
        }
        InjectionOutcome::Injected { count, persona } => {
            info!(
                session_id = %session_id,
                count = *count,
                persona = %truncate(persona, PERSONA_LOG_CHARS),
                "Persona injected into system prompt"
            );
        }
        InjectionOutcome::Failed { count, error } if error.is_recoverable() => {
            warn!(
                session_id = %session_id,
                count = *count,
                error = %error,
                "Persona update skipped, system prompt left unchanged"
            );
        }
        InjectionOutcome::Failed { count, error } => {
            error!(
                session_id = %session_id,
                count = *count,
                error = %error,
                "Persona update failed, system prompt left unchanged"
            );
        }
    }
}

#[async_trait]
impl LlmRequestHook for PersonaInjector {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn priority(&self) -> i32 {
        PERSONA_HOOK_PRIORITY
    }

    async fn on_llm_request(&self, session_id: &str, request: &mut ProviderRequest) {
        self.on_request(session_id, request).await;
    }

    fn terminate(&self) {
        PersonaInjector::terminate(self);
    }
}
