//! Text generation through a hosted chat-completion model.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate the next assistant message for an ordered conversation.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier, part of the pipeline cache key.
    fn model(&self) -> &str;

    /// Sampling temperature, if one is pinned.
    fn temperature(&self) -> Option<f32> {
        None
    }
}
