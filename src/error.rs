//! Error types for EstudIA.

use async_openai::error::OpenAIError;
use std::sync::Arc;
use thiserror::Error;

/// Library-level error type for EstudIA operations.
#[derive(Error, Debug)]
pub enum EstudiaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Vector index error: {0}")]
    Index(String),

    /// A grounded answer failed. The pipeline that produced it stays usable.
    #[error("Pipeline error: {0}")]
    Pipeline(#[source] Box<EstudiaError>),

    /// A cached pipeline build failed; every caller waiting on it sees the same error.
    #[error("Pipeline build failed: {0}")]
    BuildFailed(#[source] Arc<EstudiaError>),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The session transcript was replaced while a request was using it.
    #[error("Transcript changed: {0}")]
    DocumentChanged(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EstudiaError {
    /// Wrap a failure that happened while answering a query.
    pub fn pipeline(cause: EstudiaError) -> Self {
        EstudiaError::Pipeline(Box::new(cause))
    }

    /// The innermost error, looking through pipeline and shared-build wrappers.
    pub fn root_cause(&self) -> &EstudiaError {
        match self {
            EstudiaError::Pipeline(inner) => inner.root_cause(),
            EstudiaError::BuildFailed(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        match self.root_cause() {
            EstudiaError::Provider(e) => e.is_transient(),
            EstudiaError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Classification of an external service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Missing or rejected credentials.
    Auth,
    /// Too many requests in a short period.
    RateLimit,
    /// Account quota or billing limit reached.
    Quota,
    Timeout,
    /// Connection failures and server-side (5xx) errors.
    Network,
    /// The service answered with something we could not use.
    MalformedResponse,
    Other,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::RateLimit => "rate limit",
            ProviderErrorKind::Quota => "quota",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::MalformedResponse => "malformed response",
            ProviderErrorKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Failure of an external service (transcription, embedding, generation).
#[derive(Error, Debug, Clone)]
#[error("{provider} {kind} error: {message}")]
pub struct ProviderError {
    /// Which collaborator failed (e.g. "embedding").
    pub provider: String,
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &str, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            kind,
            message: message.into(),
        }
    }

    /// A response that could not be interpreted.
    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::MalformedResponse, message)
    }

    /// Transient failures may succeed when retried by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::RateLimit | ProviderErrorKind::Timeout | ProviderErrorKind::Network
        )
    }

    /// Classify an OpenAI client error.
    pub fn from_openai(provider: &str, err: OpenAIError) -> Self {
        let kind = match &err {
            OpenAIError::Reqwest(e) => classify_http(e),
            OpenAIError::ApiError(api) => {
                let described = format!(
                    "{} {}",
                    api.r#type.as_deref().unwrap_or_default(),
                    api.message
                );
                classify_message(&described)
            }
            OpenAIError::JSONDeserialize(_) => ProviderErrorKind::MalformedResponse,
            _ => ProviderErrorKind::Other,
        };
        Self::new(provider, kind, err.to_string())
    }
}

fn classify_http(err: &reqwest::Error) -> ProviderErrorKind {
    if err.is_timeout() {
        return ProviderErrorKind::Timeout;
    }
    if let Some(status) = err.status() {
        return match status.as_u16() {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimit,
            500..=599 => ProviderErrorKind::Network,
            _ => ProviderErrorKind::Other,
        };
    }
    if err.is_connect() || err.is_request() {
        return ProviderErrorKind::Network;
    }
    if err.is_decode() {
        return ProviderErrorKind::MalformedResponse;
    }
    ProviderErrorKind::Other
}

/// Classify an API error from its type and message text.
fn classify_message(text: &str) -> ProviderErrorKind {
    let text = text.to_lowercase();
    if text.contains("quota") || text.contains("billing") {
        ProviderErrorKind::Quota
    } else if text.contains("rate limit") || text.contains("rate_limit") {
        ProviderErrorKind::RateLimit
    } else if text.contains("api key") || text.contains("api_key") || text.contains("authentication") {
        ProviderErrorKind::Auth
    } else if text.contains("overloaded") || text.contains("server_error") {
        ProviderErrorKind::Network
    } else {
        ProviderErrorKind::Other
    }
}

/// Result type alias for EstudIA operations.
pub type Result<T> = std::result::Result<T, EstudiaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_api_messages() {
        assert_eq!(
            classify_message("invalid_request_error Incorrect API key provided: sk-***"),
            ProviderErrorKind::Auth
        );
        assert_eq!(
            classify_message("requests Rate limit reached for gpt-4-turbo"),
            ProviderErrorKind::RateLimit
        );
        assert_eq!(
            classify_message("insufficient_quota You exceeded your current quota"),
            ProviderErrorKind::Quota
        );
        assert_eq!(classify_message("something else"), ProviderErrorKind::Other);
    }

    #[test]
    fn test_transient_kinds() {
        let rate = ProviderError::new("embedding", ProviderErrorKind::RateLimit, "slow down");
        assert!(rate.is_transient());

        let auth = ProviderError::new("embedding", ProviderErrorKind::Auth, "bad key");
        assert!(!auth.is_transient());
    }

    #[test]
    fn test_root_cause_looks_through_wrappers() {
        let provider = ProviderError::new("generation", ProviderErrorKind::Timeout, "timed out");
        let err = EstudiaError::BuildFailed(Arc::new(EstudiaError::pipeline(provider.into())));

        assert!(matches!(err.root_cause(), EstudiaError::Provider(_)));
        assert!(err.is_transient());
        assert!(err.to_string().contains("timed out"));
    }
}
