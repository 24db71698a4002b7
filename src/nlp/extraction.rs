//! Entity/aspect extraction: prompt the model, parse its JSON, pick the prediction.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    llm::{CompletionBackend, CompletionError, ResponseFormat, SamplingParams},
    nlp::prompt,
};

/// Key of the pair the prediction is taken from.
pub const FIRST_PAIR_KEY: &str = "1";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("completion request failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("completion is not a valid extraction object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("extraction key {0:?} is not a positional number")]
    InvalidKey(String),

    #[error("extraction has no pair under key {0:?}")]
    MissingPair(String),

    #[error("pair {0:?} has an empty aspect list")]
    EmptyAspect(String),
}

/// One entity with the aspect phrases the model attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectPair {
    pub named_entity: String,
    #[serde(deserialize_with = "one_or_many")]
    pub aspect: Vec<String>,
}

/// Parsed model output, in the order the model listed the pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Extraction {
    pairs: IndexMap<String, AspectPair>,
}

/// The single entity/aspect prediction that gets scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub entity: String,
    pub aspect: String,
}

/// Everything one extraction run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub extraction: Extraction,
    pub prediction: Prediction,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AspectPair> {
        self.pairs.get(key)
    }

    /// Iterate pairs with their positional keys.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &AspectPair)> {
        self.pairs.iter().map(|(key, pair)| (key.as_str(), pair))
    }

    /// Entity of pair `"1"` with its first aspect. Later pairs and aspects are ignored.
    pub fn prediction(&self) -> Result<Prediction, ExtractionError> {
        let pair = self
            .get(FIRST_PAIR_KEY)
            .ok_or_else(|| ExtractionError::MissingPair(FIRST_PAIR_KEY.to_string()))?;
        let aspect = pair
            .aspect
            .first()
            .ok_or_else(|| ExtractionError::EmptyAspect(FIRST_PAIR_KEY.to_string()))?;
        Ok(Prediction {
            entity: pair.named_entity.clone(),
            aspect: aspect.clone(),
        })
    }
}

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex"));

/// Parse a completion into an [`Extraction`].
///
/// The body must be a JSON object mapping positional keys (`"1"`, `"2"`, ...) to
/// `{"named_entity": str, "aspect": [str]}`. A markdown code fence around the
/// object is stripped first.
pub fn parse_extraction(raw: &str) -> Result<Extraction, ExtractionError> {
    let body = CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str());
    let pairs: IndexMap<String, AspectPair> = serde_json::from_str(body.trim())?;
    if let Some(key) = pairs.keys().find(|key| !is_positional(key)) {
        return Err(ExtractionError::InvalidKey(key.clone()));
    }
    Ok(Extraction { pairs })
}

/// Canonical decimal only: `"1"`, `"12"`; not `" 1"`, `"01"` or `"+1"`.
fn is_positional(key: &str) -> bool {
    key.parse::<u32>()
        .map_or(false, |number| number.to_string() == key)
}

/// Runs the fixed extraction transcript against a completion backend.
pub struct Extractor<'a, B: CompletionBackend + ?Sized> {
    backend: &'a B,
    params: SamplingParams,
}

impl<'a, B: CompletionBackend + ?Sized> Extractor<'a, B> {
    /// Deterministic settings: JSON output, temperature 0, no frequency penalty, one sample.
    pub fn new(backend: &'a B, model: impl Into<String>) -> Self {
        let params = SamplingParams::default()
            .with_model(model)
            .with_response_format(ResponseFormat::JsonObject);
        Self { backend, params }
    }

    /// Override sampling parameters. The response format stays `JsonObject`.
    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params.with_response_format(ResponseFormat::JsonObject);
        self
    }

    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    #[instrument(skip(self, review), fields(model = %self.params.model))]
    pub async fn extract(&self, review: &str) -> Result<ExtractionOutcome, ExtractionError> {
        let transcript = prompt::build_transcript(review);
        let raw = self.backend.complete(&transcript, &self.params).await?;
        debug!(%raw, "raw completion");

        let extraction = parse_extraction(&raw)?;
        let prediction = extraction.prediction()?;
        info!(
            pairs = extraction.len(),
            entity = %prediction.entity,
            aspect = %prediction.aspect,
            "extracted prediction"
        );
        Ok(ExtractionOutcome {
            extraction,
            prediction,
        })
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
