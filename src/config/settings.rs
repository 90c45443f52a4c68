//! Configuration settings for EstudIA.

use crate::chunking::{ChunkingConfig, ChunkingStrategy};
use crate::index::DistanceMetric;
use crate::openai::DEFAULT_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub openai: OpenAISettings,
    pub transcription: TranscriptionSettings,
    pub summary: SummarySettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub rag: RagSettings,
    pub tutor: TutorSettings,
    pub prompts: PromptSettings,
    pub server: ServerSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// OpenAI-compatible provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// API key. When unset, `OPENAI_API_KEY` is used.
    pub api_key: Option<String>,
    /// Alternative API base URL (for OpenAI-compatible servers).
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAISettings {
    /// The configured API key, or `OPENAI_API_KEY` from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
    }

    /// Identity of the credentials, used when deriving pipeline cache keys.
    ///
    /// Contains the raw key; it only ever enters a digest.
    pub fn credential_identity(&self) -> String {
        format!(
            "{}|{}",
            self.api_base.as_deref().unwrap_or("default"),
            self.resolved_api_key().unwrap_or_default()
        )
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Speech-to-text model.
    pub model: String,
    /// Optional language hint (ISO-639-1, e.g. "es").
    pub language: Option<String>,
    /// Largest upload accepted by the provider, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Lecture summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Generate a summary after transcribing.
    pub enabled: bool,
    /// LLM model for summaries.
    pub model: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4-turbo".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Chunking strategy (fixed, boundary).
    pub strategy: ChunkingStrategy,
    /// Target chunk length in characters.
    pub size: usize,
    /// Characters shared between neighbouring chunks.
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            strategy: ChunkingStrategy::Fixed,
            size: config.size,
            overlap: config.overlap,
        }
    }
}

impl ChunkingSettings {
    pub fn config(&self) -> ChunkingConfig {
        ChunkingConfig {
            size: self.size,
            overlap: self.overlap,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Distance metric used by the vector index.
    pub metric: DistanceMetric,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            metric: DistanceMetric::Cosine,
        }
    }
}

/// Grounded (transcript-only) answer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for grounded answers.
    pub model: String,
    /// Sampling temperature for grounded answers.
    pub temperature: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".to_string(),
            temperature: 0.3,
        }
    }
}

/// Socratic tutor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorSettings {
    /// LLM model for tutoring.
    pub model: String,
    /// Maximum number of turns sent back to the model.
    pub max_history: usize,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".to_string(),
            max_history: 40,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::EstudiaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("estudia")
            .join("config.toml")
    }
}
