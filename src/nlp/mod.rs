//! Extraction and evaluation orchestration layer.

pub mod embeddings;
pub mod evaluation;
pub mod extraction;
pub mod prompt;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    data::{self, ReviewRecord},
    llm::CompletionBackend,
};

use self::{
    embeddings::Embedder,
    evaluation::{Evaluation, Evaluator},
    extraction::{ExtractionOutcome, Extractor},
};

/// Result of one pipeline run: what was extracted and how it scored.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub review: String,
    pub extraction: ExtractionOutcome,
    pub evaluation: Evaluation,
}

/// Extract a prediction for `record` and score it against the record's labels.
#[instrument(skip_all)]
pub async fn run_pipeline<B, E>(
    record: &ReviewRecord,
    extractor: &Extractor<'_, B>,
    embedder: &mut E,
    evaluator: &Evaluator,
) -> Result<PipelineReport>
where
    B: CompletionBackend + ?Sized,
    E: Embedder + ?Sized,
{
    info!(threshold = evaluator.threshold(), "starting review evaluation");
    let extraction = extractor
        .extract(&record.review)
        .await
        .context("extracting entity and aspect")?;
    let evaluation = evaluator
        .evaluate(embedder, record, &extraction.prediction)
        .context("scoring prediction against labels")?;
    Ok(PipelineReport {
        review: record.review.clone(),
        extraction,
        evaluation,
    })
}

/// Load row 0 of the review CSV at `path`, then run [`run_pipeline`] on it.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn run_from_csv<P, B, E>(
    path: P,
    extractor: &Extractor<'_, B>,
    embedder: &mut E,
    evaluator: &Evaluator,
) -> Result<PipelineReport>
where
    P: AsRef<Path>,
    B: CompletionBackend + ?Sized,
    E: Embedder + ?Sized,
{
    let path = path.as_ref();
    let record = data::load_first_review(path)
        .with_context(|| format!("loading review from {}", path.display()))?;
    run_pipeline(&record, extractor, embedder, evaluator).await
}
