//! End-to-end grounded answers over a small lecture transcript.

mod common;

use common::{
    photosynthesis_config, EchoGenerator, FlakyGenerator, GroundedGenerator, KeywordEmbedder,
    PHOTOSYNTHESIS,
};
use estudia::chunking::chunk;
use estudia::config::DEFAULT_FALLBACK_ANSWER;
use estudia::document::Document;
use estudia::rag::RagPipeline;
use estudia::EstudiaError;
use std::sync::Arc;

#[test]
fn transcript_splits_into_overlapping_chunks() {
    let chunks = chunk(PHOTOSYNTHESIS, 40, 10).unwrap();

    assert!(chunks.len() >= 2);
    assert!(chunks[1].start < chunks[0].end);
    assert!(chunks.iter().any(|c| c.text.contains("chlorophyll")));
}

#[tokio::test]
async fn answer_references_retrieved_context() {
    let pipeline = RagPipeline::build(
        &Document::new(PHOTOSYNTHESIS),
        &photosynthesis_config(),
        Arc::new(KeywordEmbedder::new()),
        Arc::new(EchoGenerator::default()),
    )
    .await
    .unwrap();

    assert_eq!(pipeline.chunk_count(), 2);

    let answer = pipeline.answer("What do plants use?").await.unwrap();
    assert!(answer.contains("chlorophyll"), "answer was: {}", answer);
}

#[tokio::test]
async fn uncovered_question_gets_fallback_answer() {
    let pipeline = RagPipeline::build(
        &Document::new(PHOTOSYNTHESIS),
        &photosynthesis_config(),
        Arc::new(KeywordEmbedder::new()),
        Arc::new(GroundedGenerator),
    )
    .await
    .unwrap();

    let response = pipeline
        .answer_with_sources("What is the capital of France?")
        .await
        .unwrap();
    assert_eq!(response.answer, DEFAULT_FALLBACK_ANSWER);
    assert!(response.not_found);

    let covered = pipeline
        .answer_with_sources("What do plants use?")
        .await
        .unwrap();
    assert!(covered.answer.contains("chlorophyll"));
    assert!(!covered.not_found);
}

#[tokio::test]
async fn answering_never_re_embeds_the_transcript() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let pipeline = RagPipeline::build(
        &Document::new(PHOTOSYNTHESIS),
        &photosynthesis_config(),
        embedder.clone(),
        Arc::new(EchoGenerator::default()),
    )
    .await
    .unwrap();

    assert_eq!(embedder.batch_calls(), 1);

    pipeline.answer("What do plants use?").await.unwrap();
    pipeline.answer("What does photosynthesis convert?").await.unwrap();

    assert_eq!(embedder.batch_calls(), 1);
    assert_eq!(embedder.query_calls(), 2);
}

#[tokio::test]
async fn sources_are_nearest_first_and_bounded() {
    let pipeline = RagPipeline::build(
        &Document::new(PHOTOSYNTHESIS),
        &photosynthesis_config(),
        Arc::new(KeywordEmbedder::new()),
        Arc::new(EchoGenerator::default()),
    )
    .await
    .unwrap();

    let response = pipeline
        .answer_with_sources("Plants use chlorophyll")
        .await
        .unwrap();

    assert_eq!(response.sources.len(), 2);
    assert!(response.sources[0].chunk.text.contains("chlorophyll"));
    assert!(response.sources[0].distance <= response.sources[1].distance);
}

#[tokio::test]
async fn generation_failure_is_a_pipeline_error_and_pipeline_stays_usable() {
    let pipeline = RagPipeline::build(
        &Document::new(PHOTOSYNTHESIS),
        &photosynthesis_config(),
        Arc::new(KeywordEmbedder::new()),
        Arc::new(FlakyGenerator::new(1)),
    )
    .await
    .unwrap();

    let err = pipeline.answer("What do plants use?").await.unwrap_err();
    match &err {
        EstudiaError::Pipeline(cause) => {
            assert!(matches!(cause.as_ref(), EstudiaError::Provider(_)));
        }
        other => panic!("expected a pipeline error, got {:?}", other),
    }
    assert!(err.is_transient());

    let answer = pipeline.answer("What do plants use?").await.unwrap();
    assert!(answer.contains("chlorophyll"));
}

#[tokio::test]
async fn build_errors_are_not_wrapped() {
    let embedder = Arc::new(KeywordEmbedder::failing(1, std::time::Duration::ZERO));
    let result = RagPipeline::build(
        &Document::new(PHOTOSYNTHESIS),
        &photosynthesis_config(),
        embedder,
        Arc::new(EchoGenerator::default()),
    )
    .await;

    assert!(matches!(result, Err(EstudiaError::Provider(_))));
}
