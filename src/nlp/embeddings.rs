//! Sentence embeddings and cosine similarity built on fastembed.

use std::path::PathBuf;

use ndarray::{Array2, Axis};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(feature = "embeddings")]
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model failed: {0}")]
    Model(String),

    #[error("expected {expected} embeddings, model returned {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("built without the `embeddings` feature; no sentence model available")]
    Unavailable,
}

/// Turns short texts into fixed-size dense vectors, one per input.
pub trait Embedder {
    fn embed(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Cosine similarity between the embeddings of `truth` and `predicted`.
    ///
    /// Each side is encoded as its own one-element batch and the score is
    /// entry (0, 0) of the resulting similarity matrix.
    fn similarity(&mut self, truth: &str, predicted: &str) -> Result<f32, EmbeddingError> {
        let truth = to_matrix(self.embed(&[truth])?, 1)?;
        let predicted = to_matrix(self.embed(&[predicted])?, 1)?;
        let scores = cosine_matrix(&truth, &predicted)?;
        Ok(scores[[0, 0]])
    }
}

impl<E: Embedder + ?Sized> Embedder for &mut E {
    fn embed(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts)
    }
}

/// all-MiniLM-L6-v2 sentence model, loaded once per process.
#[cfg(feature = "embeddings")]
pub struct SentenceEmbedder {
    model: TextEmbedding,
}

#[cfg(feature = "embeddings")]
impl SentenceEmbedder {
    /// Load the model, downloading it into `cache_dir` (or fastembed's default) on first use.
    pub fn load(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let model = TextEmbedding::try_new(options)
            .map_err(|err| EmbeddingError::Model(format!("{err:#}")))?;
        info!(model = "all-MiniLM-L6-v2", "loaded sentence embedding model");
        Ok(Self { model })
    }
}

#[cfg(feature = "embeddings")]
impl Embedder for SentenceEmbedder {
    fn embed(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let vectors = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|err| EmbeddingError::Model(format!("{err:#}")))?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        debug!(count = vectors.len(), "embedded texts");
        Ok(vectors)
    }
}

/// Stand-in when fastembed is compiled out; every call reports [`EmbeddingError::Unavailable`].
#[cfg(not(feature = "embeddings"))]
pub struct SentenceEmbedder {
    _private: (),
}

#[cfg(not(feature = "embeddings"))]
impl SentenceEmbedder {
    pub fn load(_cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        info!("sentence embeddings disabled at build time");
        Err(EmbeddingError::Unavailable)
    }
}

#[cfg(not(feature = "embeddings"))]
impl Embedder for SentenceEmbedder {
    fn embed(&mut self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!("embedding requested without a model");
        Err(EmbeddingError::Unavailable)
    }
}

/// Pairwise cosine similarities: entry (i, j) compares row i of `a` with row j of `b`.
///
/// Zero-norm rows score 0 against everything.
pub fn cosine_matrix(a: &Array2<f32>, b: &Array2<f32>) -> Result<Array2<f32>, EmbeddingError> {
    if a.ncols() != b.ncols() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.ncols(),
            right: b.ncols(),
        });
    }
    Ok(normalize_rows(a).dot(&normalize_rows(b).t()))
}

fn normalize_rows(matrix: &Array2<f32>) -> Array2<f32> {
    let mut out = matrix.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    out
}

fn to_matrix(vectors: Vec<Vec<f32>>, expected: usize) -> Result<Array2<f32>, EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }
    let dim = vectors.first().map_or(0, Vec::len);
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(EmbeddingError::DimensionMismatch {
            left: dim,
            right: bad.len(),
        });
    }
    let flat: Vec<f32> = vectors.into_iter().flatten().collect();
    Array2::from_shape_vec((expected, dim), flat).map_err(|_| EmbeddingError::DimensionMismatch {
        left: dim,
        right: dim,
    })
}
