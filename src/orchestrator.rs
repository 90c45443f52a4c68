//! Application orchestrator for EstudIA.
//!
//! Wires settings, providers and the process-wide pipeline cache. The CLI and the HTTP
//! server go through this type for every operation.

use crate::config::{Prompts, Settings};
use crate::document::Document;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::generation::{ChatMessage, Generator, OpenAIGenerator};
use crate::openai::create_client;
use crate::rag::{CacheKey, GroundedAnswer, PipelineCache, PipelineConfig, RagPipeline};
use crate::summary::Summarizer;
use crate::transcription::{Transcriber, WhisperTranscriber};
use crate::tutor::{Tutor, TutorProfile};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A transcribed lecture.
#[derive(Debug, Clone)]
pub struct Lecture {
    pub document: Document,
    /// Markdown summary, when summaries are enabled and generation succeeded.
    pub summary: Option<String>,
}

/// The main orchestrator for EstudIA.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    pipeline_config: PipelineConfig,
    transcriber: Arc<dyn Transcriber>,
    embedder: Arc<dyn Embedder>,
    rag_generator: Arc<dyn Generator>,
    summary_generator: Arc<dyn Generator>,
    tutor_generator: Arc<dyn Generator>,
    cache: PipelineCache,
    credential: String,
}

impl Orchestrator {
    /// Create an orchestrator backed by the OpenAI-compatible API.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = create_client(&settings.openai)?;

        let transcriber = Arc::new(WhisperTranscriber::with_client(
            client.clone(),
            &settings.transcription,
        ));
        let embedder = Arc::new(OpenAIEmbedder::with_client(
            client.clone(),
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let rag_generator = Arc::new(
            OpenAIGenerator::with_client(client.clone(), &settings.rag.model)
                .with_temperature(settings.rag.temperature),
        );
        let summary_generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::with_client(
            client.clone(),
            &settings.summary.model,
        ));
        let tutor_generator: Arc<dyn Generator> =
            Arc::new(OpenAIGenerator::with_client(client, &settings.tutor.model));

        info!(
            embedding = %settings.embedding.model,
            generation = %settings.rag.model,
            "Initialized providers"
        );

        let mut orchestrator = Self::with_components(
            settings,
            prompts,
            transcriber,
            embedder,
            rag_generator,
        )?;
        orchestrator.summary_generator = summary_generator;
        orchestrator.tutor_generator = tutor_generator;
        Ok(orchestrator)
    }

    /// Create an orchestrator with custom components.
    ///
    /// `generator` serves grounded answers, summaries and tutoring alike.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let pipeline_config = PipelineConfig::from_settings(&settings, &prompts)?;
        let credential = settings.openai.credential_identity();

        Ok(Self {
            settings,
            prompts,
            pipeline_config,
            transcriber,
            embedder,
            rag_generator: generator.clone(),
            summary_generator: generator.clone(),
            tutor_generator: generator,
            cache: PipelineCache::new(),
            credential,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    pub fn pipeline_config(&self) -> &PipelineConfig {
        &self.pipeline_config
    }

    /// The process-wide pipeline cache.
    pub fn cache(&self) -> &PipelineCache {
        &self.cache
    }

    /// Transcribe a recording.
    pub async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<Document> {
        self.transcriber.transcribe(audio, filename).await
    }

    /// Transcribe a recording and, when enabled, summarize it.
    ///
    /// A failed summary is logged and leaves `summary` empty; the transcript is kept.
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub async fn process_recording(&self, audio: Vec<u8>, filename: &str) -> Result<Lecture> {
        let document = self.transcribe(audio, filename).await?;

        let summary = if self.settings.summary.enabled {
            match self.summarize(&document).await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Failed to summarize {}: {}", filename, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Lecture { document, summary })
    }

    pub async fn summarize(&self, document: &Document) -> Result<String> {
        Summarizer::new(self.summary_generator.clone(), self.prompts.summary.system.clone())
            .summarize(document)
            .await
    }

    /// The cache key for `document` under the current configuration.
    pub fn cache_key(&self, document: &Document) -> CacheKey {
        CacheKey::derive(
            document,
            &self.pipeline_config,
            self.embedder.as_ref(),
            self.rag_generator.as_ref(),
            &self.credential,
        )
    }

    /// The grounded pipeline for `document`, built on first use.
    pub async fn pipeline_for(&self, document: &Document) -> Result<Arc<RagPipeline>> {
        let key = self.cache_key(document);

        let document = document.clone();
        let config = self.pipeline_config.clone();
        let embedder = self.embedder.clone();
        let generator = self.rag_generator.clone();

        self.cache
            .get_or_build(&key, move || async move {
                RagPipeline::build(&document, &config, embedder, generator).await
            })
            .await
    }

    /// Answer `question` from `document` only.
    pub async fn ask(&self, document: &Document, question: &str) -> Result<GroundedAnswer> {
        let pipeline = self.pipeline_for(document).await?;
        pipeline.answer_with_sources(question).await
    }

    /// Continue a tutoring conversation.
    pub async fn tutor_reply(
        &self,
        profile: TutorProfile,
        history: &[ChatMessage],
        input: &str,
    ) -> Result<String> {
        Tutor::for_profile(
            self.tutor_generator.clone(),
            profile,
            &self.prompts,
            self.settings.tutor.max_history,
        )
        .reply(history, input)
        .await
    }
}
