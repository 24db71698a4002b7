//! CLI entry-point for the full extract-then-score pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data,
    llm::{OpenAiClient, ResponseFormat, SamplingParams},
    nlp::{
        self,
        embeddings::SentenceEmbedder,
        evaluation::{Evaluator, FieldEvaluation, NonePolicy},
        extraction::Extractor,
        PipelineReport,
    },
};

/// Args for the `evaluate` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Review CSV with `review`, `true_entity` and `true_aspect` columns. Row 0 is evaluated.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Minimum cosine similarity for a prediction to be kept.
    #[arg(long)]
    pub threshold: Option<f32>,
    /// Chat model id.
    #[arg(long)]
    pub model: Option<String>,
    /// Sampling temperature.
    #[arg(long, default_value_t = 0.0)]
    pub temperature: f32,
    /// Frequency penalty.
    #[arg(long, default_value_t = 0.0)]
    pub frequency_penalty: f32,
    /// Embed "None" like any other phrase instead of treating it as absent.
    #[arg(long)]
    pub literal_none: bool,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let input = args.input.unwrap_or_else(|| settings.review_csv.clone());
    let threshold = args.threshold.unwrap_or(settings.similarity_threshold);
    let none_policy = if args.literal_none {
        NonePolicy::Literal
    } else {
        NonePolicy::Explicit
    };

    // cheap checks first; the embedding model may need a download
    let api_key = settings.require_api_key()?;
    let record = data::load_first_review(&input)
        .with_context(|| format!("loading review from {}", input.display()))?;
    let client = OpenAiClient::new(&settings.api_base_url, api_key)
        .context("building completion client")?;

    let params = SamplingParams {
        model: args.model.unwrap_or_else(|| settings.completion_model.clone()),
        temperature: args.temperature,
        frequency_penalty: args.frequency_penalty,
        n: 1,
        response_format: ResponseFormat::JsonObject,
    };
    let extractor = Extractor::new(&client, params.model.clone()).with_params(params);
    let evaluator = Evaluator::new(threshold).with_none_policy(none_policy);
    let mut embedder = SentenceEmbedder::load(settings.embedding_cache_dir.clone())
        .context("loading sentence embedding model")?;

    let report = nlp::run_pipeline(&record, &extractor, &mut embedder, &evaluator).await?;
    info!(
        keep_entity = report.evaluation.keep_entity(),
        keep_aspect = report.evaluation.keep_aspect(),
        "evaluation complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_summary(&report));
    }
    Ok(())
}

/// Plain-text rendering of a pipeline report.
pub fn render_summary(report: &PipelineReport) -> String {
    let evaluation = &report.evaluation;
    let mut out = format!("review:    {}\n", report.review.trim());
    out.push_str(&render_field("entity", &evaluation.entity));
    out.push_str(&render_field("aspect", &evaluation.aspect));
    out.push_str(&format!("threshold: {:.2}\n", evaluation.threshold));
    out
}

fn render_field(label: &str, field: &FieldEvaluation) -> String {
    let verdict = if field.keep { "keep" } else { "reject" };
    format!(
        "{label}:    {:?} vs {:?} -> {:.3} ({verdict})\n",
        field.truth, field.predicted, field.score
    )
}
