// src/config/file.rs
// File-based configuration from ~/.dynamic-persona/config.toml

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "PERSONA_CONFIG";

/// Top-level config structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub persona: PersonaSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
}

/// `[persona]` section, raw and unvalidated
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PersonaSection {
    pub enabled: Option<bool>,
    // Signed so that 0 or negative values can be reported and coerced
    pub update_frequency: Option<i64>,
    pub include_time: Option<bool>,
    pub persona_provider_id: Option<String>,
    pub custom_generation_prompt: Option<String>,
}

/// `[llm]` section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmSection {
    /// Provider id used when no persona provider is pinned
    pub default_provider: Option<String>,
}

/// One `[[providers]]` entry: an OpenAI-compatible endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderSpec {
    pub id: String,
    pub base_url: String,
    pub model: String,
    /// Name of the env var holding the API key; omit for keyless local servers
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl FileConfig {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    /// Load config from a path, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from a path, surfacing read and parse errors
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the config file path: `$PERSONA_CONFIG`, else ~/.dynamic-persona/config.toml
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dynamic-persona")
            .join("config.toml")
    }
}
