// src/error.rs
// Error taxonomy for persona generation and configuration

use thiserror::Error;

use crate::persona::TemplateError;

/// Main error type for the persona library
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("no LLM provider available for persona generation")]
    NoProvider,

    #[error("prompt template error: {0}")]
    Template(#[from] TemplateError),

    #[error("persona generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    #[error("persona generation cancelled")]
    Cancelled,

    #[error("persona LLM returned empty content")]
    EmptyResult,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Result using PersonaError
pub type Result<T> = std::result::Result<T, PersonaError>;

impl PersonaError {
    /// Recoverable failures are logged at warn, everything else at error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PersonaError::EmptyResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_provider_error() {
        let err = PersonaError::NoProvider;
        assert!(err.to_string().contains("no LLM provider"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_template_error_wraps() {
        let err: PersonaError = TemplateError::MissingPlaceholder.into();
        assert!(matches!(err, PersonaError::Template(_)));
        assert!(err.to_string().contains("prompt template error"));
    }

    #[test]
    fn test_generation_error_keeps_message() {
        let err = PersonaError::Generation(anyhow::anyhow!("rate limited"));
        assert!(err.to_string().contains("persona generation failed"));
        assert!(err.to_string().contains("rate limited"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_empty_result_is_recoverable() {
        assert!(PersonaError::EmptyResult.is_recoverable());
    }

    #[test]
    fn test_cancelled_error() {
        let err = PersonaError::Cancelled;
        assert!(err.to_string().contains("cancelled"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PersonaError = io_err.into();
        assert!(matches!(err, PersonaError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: PersonaError = toml_err.into();
        assert!(matches!(err, PersonaError::Toml(_)));
    }
}
