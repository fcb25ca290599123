// src/config/mod.rs
// Configuration: TOML file, environment overrides, validated persona options

pub mod env;
pub mod file;
pub mod persona;

pub use env::{ConfigValidation, EnvOverrides};
pub use file::{FileConfig, LlmSection, PersonaSection, ProviderSpec};
pub use persona::{DEFAULT_UPDATE_FREQUENCY, PersonaConfig};

use std::path::Path;
use tracing::{info, warn};

/// Log level used when PERSONA_LOG_LEVEL is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Everything the host needs to stand up the persona hook
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub persona: PersonaConfig,
    /// Raw file config; provider entries are consumed by `ProviderFactory`
    pub file: FileConfig,
    pub log_level: String,
}

impl AppConfig {
    /// Load `.env`, the config file and environment overrides
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded .env file");
        }
        let (config, validation) = Self::assemble(FileConfig::load(), EnvOverrides::from_env());
        config.log_validation(&validation);
        config
    }

    /// Like [`load`](Self::load) but from an explicit config path
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        let file = FileConfig::load_from(path)?;
        let (config, validation) = Self::assemble(file, EnvOverrides::from_env());
        config.log_validation(&validation);
        Ok(config)
    }

    /// Combine file and env layers without touching the process environment
    pub fn assemble(mut file: FileConfig, env: EnvOverrides) -> (Self, ConfigValidation) {
        let (persona, mut validation) = PersonaConfig::resolve(&file.persona, &env);

        if let Some(default_provider) = env.default_provider.clone() {
            file.llm.default_provider = Some(default_provider);
        }
        validation.merge(Self::validate_providers(&file));

        let log_level = env
            .log_level
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        (
            Self {
                persona,
                file,
                log_level,
            },
            validation,
        )
    }

    fn validate_providers(file: &FileConfig) -> ConfigValidation {
        let mut validation = ConfigValidation::new();
        for spec in &file.providers {
            if spec.model.trim().is_empty() {
                validation.add_error(format!("provider '{}' has no model", spec.id));
            }
            if let Some(ref var) = spec.api_key_env {
                let set = std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false);
                if !set {
                    validation.add_warning(format!(
                        "provider '{}': {} not set, provider will be skipped",
                        spec.id, var
                    ));
                }
            }
        }
        if let Some(ref id) = file.llm.default_provider {
            if !file.providers.iter().any(|p| &p.id == id) {
                validation.add_warning(format!("default provider '{}' is not configured", id));
            }
        }
        validation
    }

    fn log_validation(&self, validation: &ConfigValidation) {
        for w in &validation.warnings {
            warn!("Config: {}", w);
        }
        for e in &validation.errors {
            warn!("Config error: {}", e);
        }
        info!(
            enabled = self.persona.enabled,
            update_frequency = self.persona.update_frequency,
            include_time = self.persona.include_time,
            provider = ?self.persona.persona_provider_id,
            "Persona configuration loaded"
        );
    }
}
