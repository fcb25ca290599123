// src/config/persona.rs
// Validated persona options, resolved from file + environment

use super::env::{ConfigValidation, EnvOverrides};
use super::file::PersonaSection;
use crate::persona::PromptTemplate;
use tracing::warn;

/// Trigger cadence used when none (or an invalid one) is configured
pub const DEFAULT_UPDATE_FREQUENCY: u32 = 1;

/// Persona trigger options. Always holds valid values; build it through
/// [`PersonaConfig::resolve`] or the builder methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaConfig {
    pub enabled: bool,
    /// Trigger every Nth qualifying request per session (>= 1)
    pub update_frequency: u32,
    pub include_time: bool,
    pub persona_provider_id: Option<String>,
    pub custom_generation_prompt: PromptTemplate,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_frequency: DEFAULT_UPDATE_FREQUENCY,
            include_time: true,
            persona_provider_id: None,
            custom_generation_prompt: PromptTemplate::default(),
        }
    }
}

impl PersonaConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the cadence; 0 is coerced to the default
    pub fn with_update_frequency(mut self, frequency: u32) -> Self {
        self.update_frequency = if frequency == 0 {
            warn!("update_frequency 0 is invalid, using {}", DEFAULT_UPDATE_FREQUENCY);
            DEFAULT_UPDATE_FREQUENCY
        } else {
            frequency
        };
        self
    }

    pub fn with_include_time(mut self, include_time: bool) -> Self {
        self.include_time = include_time;
        self
    }

    /// Pin persona generation to a provider id; blank ids mean "unset"
    pub fn with_provider_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.persona_provider_id = (!id.trim().is_empty()).then_some(id);
        self
    }

    pub fn with_generation_prompt(mut self, template: impl Into<String>) -> Self {
        self.custom_generation_prompt = PromptTemplate::new(template);
        self
    }

    /// Whether the `count`-th request of a session triggers regeneration
    pub fn is_triggered(&self, count: u64) -> bool {
        count % u64::from(self.update_frequency.max(1)) == 0
    }

    /// Merge the `[persona]` file section with env overrides (env wins).
    ///
    /// Invalid values are coerced to defaults and reported as warnings.
    /// A template that would not render is kept as configured, so every
    /// trigger fails loudly instead of silently using another prompt.
    pub fn resolve(section: &PersonaSection, env: &EnvOverrides) -> (Self, ConfigValidation) {
        let mut validation = ConfigValidation::new();
        let defaults = Self::default();

        let enabled = env.enabled.or(section.enabled).unwrap_or(defaults.enabled);
        let include_time = env
            .include_time
            .or(section.include_time)
            .unwrap_or(defaults.include_time);

        let update_frequency = match env.update_frequency.or(section.update_frequency) {
            None => DEFAULT_UPDATE_FREQUENCY,
            Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
            Some(n) => {
                validation.add_warning(format!(
                    "update_frequency must be a positive integer (got {}), using {}",
                    n, DEFAULT_UPDATE_FREQUENCY
                ));
                DEFAULT_UPDATE_FREQUENCY
            }
        };

        let persona_provider_id = env
            .persona_provider_id
            .clone()
            .or_else(|| section.persona_provider_id.clone())
            .filter(|id| !id.trim().is_empty());

        let custom_generation_prompt = env
            .generation_prompt
            .clone()
            .or_else(|| section.custom_generation_prompt.clone())
            .filter(|t| !t.trim().is_empty())
            .map(PromptTemplate::new)
            .unwrap_or_default();

        if let Err(e) = custom_generation_prompt.validate() {
            validation.add_warning(format!("custom_generation_prompt will not render: {}", e));
        }

        let config = Self {
            enabled,
            update_frequency,
            include_time,
            persona_provider_id,
            custom_generation_prompt,
        };
        (config, validation)
    }
}
