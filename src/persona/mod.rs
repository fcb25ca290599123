// src/persona/mod.rs
// Dynamic persona generation and system prompt injection

mod context;
mod counter;
mod injector;
mod template;

pub use context::{GenerationContext, TIMESTAMP_FORMAT};
pub use counter::SessionCounters;
pub use injector::{InjectionOutcome, PersonaInjector};
pub use template::{CONTEXT_PLACEHOLDER, DEFAULT_GENERATION_PROMPT, PromptTemplate, TemplateError};
