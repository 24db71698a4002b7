//! CLI entry-point for extraction without scoring.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    data,
    llm::OpenAiClient,
    nlp::extraction::{ExtractionOutcome, Extractor},
};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Review CSV; only the `review` text of row 0 is used.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Chat model id.
    #[arg(long)]
    pub model: Option<String>,
    /// Print the parsed extraction as JSON.
    #[arg(long)]
    pub json: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let input = args.input.unwrap_or_else(|| settings.review_csv.clone());
    let record = data::load_first_review(&input)
        .with_context(|| format!("loading review from {}", input.display()))?;

    let client = OpenAiClient::new(&settings.api_base_url, settings.require_api_key()?)
        .context("building completion client")?;
    let model = args
        .model
        .unwrap_or_else(|| settings.completion_model.clone());
    let outcome = Extractor::new(&client, model)
        .extract(&record.review)
        .await
        .context("extracting entity and aspect")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_pairs(&outcome));
    }
    Ok(())
}

/// One line per extracted pair, then the prediction that would be scored.
pub fn render_pairs(outcome: &ExtractionOutcome) -> String {
    let mut out = String::new();
    for (key, pair) in outcome.extraction.pairs() {
        out.push_str(&format!(
            "{key}. {} -> {}\n",
            pair.named_entity,
            pair.aspect.join(" | ")
        ));
    }
    out.push_str(&format!(
        "prediction: {} / {}\n",
        outcome.prediction.entity, outcome.prediction.aspect
    ));
    out
}
