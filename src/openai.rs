//! OpenAI client configuration with sensible defaults.

use crate::config::OpenAISettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Shared OpenAI client type.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create an OpenAI client from the `[openai]` settings.
///
/// The API key falls back to `OPENAI_API_KEY` when not set in the config file.
pub fn create_client(settings: &OpenAISettings) -> Result<OpenAIClient> {
    let mut config = OpenAIConfig::new();
    if let Some(key) = settings.resolved_api_key() {
        config = config.with_api_key(key);
    }
    if let Some(base) = &settings.api_base {
        config = config.with_api_base(base);
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
