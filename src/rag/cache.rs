//! Build-once reuse of grounded answer pipelines.

use super::pipeline::{PipelineConfig, RagPipeline};
use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{EstudiaError, Result};
use crate::generation::Generator;
use futures::future::{BoxFuture, FutureExt, Shared};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Identity of a pipeline: the transcript plus everything that shapes its answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `document` under `config` and the given providers.
    ///
    /// `credential` only ever enters the digest.
    pub fn derive(
        document: &Document,
        config: &PipelineConfig,
        embedder: &dyn Embedder,
        generator: &dyn Generator,
        credential: &str,
    ) -> Self {
        let mut hasher = Sha256::new();
        let mut field = |name: &str, value: &str| {
            hasher.update(name.as_bytes());
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        };

        field("document", document.text());
        field("chunking.strategy", &config.strategy.to_string());
        field("chunking.size", &config.chunking.size.to_string());
        field("chunking.overlap", &config.chunking.overlap.to_string());
        field("retrieval.top_k", &config.top_k.to_string());
        field("retrieval.metric", &config.metric.to_string());
        field("prompt.template", config.prompt.template());
        field("prompt.fallback", config.prompt.fallback_answer());
        field("embedding.model", embedder.model());
        field("embedding.dimensions", &embedder.dimensions().to_string());
        field("generation.model", generator.model());
        field(
            "generation.temperature",
            &generator
                .temperature()
                .map(|t| t.to_string())
                .unwrap_or_default(),
        );
        field("credential", credential);

        Self(format!("sha256:{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type SharedBuild =
    Shared<BoxFuture<'static, std::result::Result<Arc<RagPipeline>, Arc<EstudiaError>>>>;

/// Pipelines keyed by [`CacheKey`], each built at most once while it succeeds.
///
/// Concurrent callers for the same key share one in-flight build. A failed build is
/// reported to every caller waiting on it and then forgotten, so the next call retries.
#[derive(Default)]
pub struct PipelineCache {
    builds: Mutex<HashMap<CacheKey, SharedBuild>>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pipeline for `key`, running `builder` only if none exists or is building.
    pub async fn get_or_build<F, Fut>(&self, key: &CacheKey, builder: F) -> Result<Arc<RagPipeline>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RagPipeline>> + Send + 'static,
    {
        let build = {
            let mut builds = self.builds.lock().await;
            match builds.get(key) {
                Some(existing) => {
                    debug!(key = %key, "Reusing pipeline");
                    existing.clone()
                }
                None => {
                    info!(key = %key, "Building pipeline");
                    let build = builder()
                        .map(|result| result.map(Arc::new).map_err(Arc::new))
                        .boxed()
                        .shared();
                    builds.insert(key.clone(), build.clone());
                    build
                }
            }
        };

        match build.clone().await {
            Ok(pipeline) => Ok(pipeline),
            Err(e) => {
                let mut builds = self.builds.lock().await;
                if builds.get(key).is_some_and(|current| current.ptr_eq(&build)) {
                    warn!(key = %key, error = %e, "Pipeline build failed");
                    builds.remove(key);
                }
                Err(EstudiaError::BuildFailed(e))
            }
        }
    }

    /// Number of pipelines built or building.
    pub async fn len(&self) -> usize {
        self.builds.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.builds.lock().await.is_empty()
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.builds.lock().await.contains_key(key)
    }
}
