//! Threshold acceptance of predictions by embedding similarity to the ground truth.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    data::ReviewRecord,
    nlp::{
        embeddings::{EmbeddingError, Embedder},
        extraction::Prediction,
    },
};

/// Similarity at or above which a prediction is kept.
pub const DEFAULT_THRESHOLD: f32 = 0.85;

/// How the prompt's `"None"` absence marker is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NonePolicy {
    /// `"None"` means absent: absent/absent scores 1 and is kept, absent/present scores 0
    /// and is rejected at any threshold. Nothing is embedded.
    #[default]
    Explicit,
    /// `"None"` is embedded like any other phrase.
    Literal,
}

/// Score and verdict for one field (entity or aspect).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEvaluation {
    pub truth: String,
    pub predicted: String,
    pub score: f32,
    pub keep: bool,
}

/// Per-field acceptance for one review. The two fields are never combined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub threshold: f32,
    pub entity: FieldEvaluation,
    pub aspect: FieldEvaluation,
}

impl Evaluation {
    pub fn entity_score(&self) -> f32 {
        self.entity.score
    }

    pub fn aspect_score(&self) -> f32 {
        self.aspect.score
    }

    pub fn keep_entity(&self) -> bool {
        self.entity.keep
    }

    pub fn keep_aspect(&self) -> bool {
        self.aspect.keep
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluator {
    threshold: f32,
    none_policy: NonePolicy,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Evaluator {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            none_policy: NonePolicy::default(),
        }
    }

    pub fn with_none_policy(mut self, none_policy: NonePolicy) -> Self {
        self.none_policy = none_policy;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn none_policy(&self) -> NonePolicy {
        self.none_policy
    }

    /// `score >= threshold`.
    pub fn accepts(&self, score: f32) -> bool {
        score >= self.threshold
    }

    /// Score one true/predicted pair and apply the threshold.
    pub fn evaluate_field<E: Embedder + ?Sized>(
        &self,
        embedder: &mut E,
        truth: &str,
        predicted: &str,
    ) -> Result<FieldEvaluation, EmbeddingError> {
        let (score, keep) = match (self.none_policy, is_none(truth), is_none(predicted)) {
            (NonePolicy::Explicit, true, true) => (1.0, true),
            // one side absent: a non-match whatever the threshold
            (NonePolicy::Explicit, true, false) | (NonePolicy::Explicit, false, true) => {
                (0.0, false)
            }
            _ => {
                let score = embedder.similarity(truth, predicted)?;
                (score, self.accepts(score))
            }
        };
        debug!(score, keep, threshold = self.threshold, "scored field");
        Ok(FieldEvaluation {
            truth: truth.to_string(),
            predicted: predicted.to_string(),
            score,
            keep,
        })
    }

    /// Score entity and aspect of a prediction against the labelled record.
    pub fn evaluate<E: Embedder + ?Sized>(
        &self,
        embedder: &mut E,
        record: &ReviewRecord,
        prediction: &Prediction,
    ) -> Result<Evaluation, EmbeddingError> {
        let entity = self.evaluate_field(embedder, &record.true_entity, &prediction.entity)?;
        let aspect = self.evaluate_field(embedder, &record.true_aspect, &prediction.aspect)?;
        info!(
            entity_score = entity.score,
            keep_entity = entity.keep,
            aspect_score = aspect.score,
            keep_aspect = aspect.keep,
            threshold = self.threshold,
            "evaluated prediction"
        );
        Ok(Evaluation {
            threshold: self.threshold,
            entity,
            aspect,
        })
    }
}

fn is_none(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("none")
}
