//! Grounded question answering over a lecture transcript.
//!
//! A [`RagPipeline`] chunks and embeds one transcript once, then answers questions using
//! only the retrieved excerpts. [`PipelineCache`] shares built pipelines between callers.

mod cache;
mod pipeline;
mod prompt;
mod retriever;

pub use cache::{CacheKey, PipelineCache};
pub use pipeline::{GroundedAnswer, PipelineConfig, RagPipeline};
pub use prompt::GroundedPrompt;
pub use retriever::{join_context, Retriever, CONTEXT_SEPARATOR};
