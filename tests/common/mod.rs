//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use estudia::chunking::ChunkingConfig;
use estudia::config::DEFAULT_FALLBACK_ANSWER;
use estudia::embedding::{Embedder, Embedding};
use estudia::generation::{ChatMessage, Generator};
use estudia::rag::PipelineConfig;
use estudia::{ProviderError, ProviderErrorKind, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const PHOTOSYNTHESIS: &str =
    "Photosynthesis converts light into energy. Plants use chlorophyll.";

const DIMENSIONS: usize = 32;

/// Pipeline settings used by the photosynthesis scenarios.
pub fn photosynthesis_config() -> PipelineConfig {
    PipelineConfig {
        chunking: ChunkingConfig::new(40, 10).unwrap(),
        top_k: 4,
        ..PipelineConfig::default()
    }
}

/// Hashes lowercase words into a small bag-of-words vector and counts its calls.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub query_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub embedded_texts: AtomicUsize,
    /// Delay applied to batch calls, to keep builds in flight.
    pub batch_delay: Option<Duration>,
    /// Fail the first this-many batch calls.
    pub failing_batches: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            batch_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing(batches: usize, delay: Duration) -> Self {
        Self {
            batch_delay: Some(delay),
            failing_batches: AtomicUsize::new(batches),
            ..Self::default()
        }
    }

    pub fn vector(text: &str) -> Embedding {
        let mut v = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
            v[hash as usize % DIMENSIONS] += 1.0;
        }
        v
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }

        let remaining = self.failing_batches.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_batches.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::new(
                "embedding",
                ProviderErrorKind::RateLimit,
                "rate limit reached",
            )
            .into());
        }

        self.embedded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    fn model(&self) -> &str {
        "keyword-hash"
    }
}

/// Returns the retrieved context section of the prompt unchanged.
#[derive(Default)]
pub struct EchoGenerator {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(split_prompt(prompt).0.to_string())
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Follows the grounding instruction: answers from the context when the question's
/// content words appear there, otherwise replies with the fallback answer.
#[derive(Default)]
pub struct GroundedGenerator;

#[async_trait]
impl Generator for GroundedGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        let (context, question) = split_prompt(prompt);
        let context = context.to_lowercase();

        let covered = question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 5)
            .any(|w| context.contains(&w.to_lowercase()));

        if covered {
            Ok(context.trim().to_string())
        } else {
            Ok(DEFAULT_FALLBACK_ANSWER.to_string())
        }
    }

    fn model(&self) -> &str {
        "grounded"
    }
}

/// Fails the first `failures` calls with a timeout, then echoes.
pub struct FlakyGenerator {
    failures: AtomicUsize,
}

impl FlakyGenerator {
    pub fn new(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl Generator for FlakyGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(
                ProviderError::new("generation", ProviderErrorKind::Timeout, "timed out").into(),
            );
        }
        EchoGenerator::default().generate(messages).await
    }

    fn model(&self) -> &str {
        "flaky"
    }
}

/// Echoes after a fixed delay, to keep requests in flight.
pub struct SlowGenerator {
    delay: Duration,
}

impl SlowGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Generator for SlowGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        EchoGenerator::default().generate(messages).await
    }

    fn model(&self) -> &str {
        "slow"
    }
}

/// Split a rendered grounded prompt into (context, question).
pub fn split_prompt(prompt: &str) -> (&str, &str) {
    let after_context = prompt
        .split_once("Context (transcript):")
        .map(|(_, rest)| rest)
        .unwrap_or(prompt);
    match after_context.split_once("User question:") {
        Some((context, question)) => (context.trim(), question.trim()),
        None => (after_context.trim(), ""),
    }
}

/// Treats the uploaded bytes as the transcript text.
pub struct TextTranscriber;

#[async_trait]
impl estudia::transcription::Transcriber for TextTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<estudia::document::Document> {
        estudia::transcription::check_upload(&audio, filename, 1024 * 1024)?;
        let text = String::from_utf8_lossy(&audio).into_owned();
        Ok(estudia::document::Document::new(text).with_source(filename))
    }
}
