// src/config/env.rs
// Environment overrides and configuration validation

use tracing::warn;

/// Persona-related environment overrides (all optional)
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// PERSONA_ENABLED
    pub enabled: Option<bool>,
    /// PERSONA_UPDATE_FREQUENCY
    pub update_frequency: Option<i64>,
    /// PERSONA_INCLUDE_TIME
    pub include_time: Option<bool>,
    /// PERSONA_PROVIDER_ID
    pub persona_provider_id: Option<String>,
    /// PERSONA_GENERATION_PROMPT
    pub generation_prompt: Option<String>,
    /// DEFAULT_LLM_PROVIDER
    pub default_provider: Option<String>,
    /// PERSONA_LOG_LEVEL
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary lookup (tests, embedded hosts)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let read_bool = |name: &str| {
            let raw = read(name)?;
            let parsed = parse_bool(&raw);
            if parsed.is_none() {
                warn!(var = name, value = %raw, "Ignoring invalid boolean");
            }
            parsed
        };

        let update_frequency = read("PERSONA_UPDATE_FREQUENCY").and_then(|raw| {
            match raw.trim().parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(value = %raw, "Ignoring non-numeric PERSONA_UPDATE_FREQUENCY");
                    None
                }
            }
        });

        Self {
            enabled: read_bool("PERSONA_ENABLED"),
            update_frequency,
            include_time: read_bool("PERSONA_INCLUDE_TIME"),
            persona_provider_id: read("PERSONA_PROVIDER_ID"),
            generation_prompt: read("PERSONA_GENERATION_PROMPT"),
            default_provider: read("DEFAULT_LLM_PROVIDER"),
            log_level: read("PERSONA_LOG_LEVEL"),
        }
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration validation result
#[derive(Debug, Clone)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn merge(&mut self, other: ConfigValidation) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}
