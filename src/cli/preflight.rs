//! Pre-flight checks before expensive operations.
//!
//! Validates configuration before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{EstudiaError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Transcription needs an API key.
    Transcribe,
    /// Grounded answers, summaries and tutoring need an API key and a valid pipeline config.
    Ask,
    /// Serving needs everything the other operations need.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_api_key(settings)?;
    match operation {
        Operation::Transcribe => {}
        Operation::Ask | Operation::Serve => {
            settings.chunking.config().validate()?;
            if settings.retrieval.top_k == 0 {
                return Err(EstudiaError::Config(
                    "retrieval.top_k must be greater than zero".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Check if an OpenAI API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    match settings.openai.resolved_api_key() {
        Some(_) => Ok(()),
        None => Err(EstudiaError::Config(
            "No API key configured. Set openai.api_key or export OPENAI_API_KEY='sk-...'"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_key() -> Settings {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-test".to_string());
        settings
    }

    #[test]
    fn test_configured_key_passes() {
        assert!(check(Operation::Transcribe, &settings_with_key()).is_ok());
        assert!(check(Operation::Ask, &settings_with_key()).is_ok());
    }

    #[test]
    fn test_bad_chunking_fails_before_asking() {
        let mut settings = settings_with_key();
        settings.chunking.overlap = settings.chunking.size;

        assert!(check(Operation::Transcribe, &settings).is_ok());
        assert!(matches!(
            check(Operation::Ask, &settings),
            Err(EstudiaError::Config(_))
        ));
    }
}
