//! Runtime configuration utilities for aspect-eval.

use std::{env, fmt, path::PathBuf};

use anyhow::{anyhow, Context};

use crate::{llm::DEFAULT_MODEL, nlp::evaluation::DEFAULT_THRESHOLD};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration resolved from `.env` and defaults.
#[derive(Clone)]
pub struct Settings {
    /// Bearer token for the completion API. Only required by commands that call it.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible chat completion API.
    pub api_base_url: String,
    /// Chat model used for extraction.
    pub completion_model: String,
    /// CSV read when no `--input` is given.
    pub review_csv: PathBuf,
    /// Minimum cosine similarity at which a prediction is kept.
    pub similarity_threshold: f32,
    /// Where the embedding model is cached; fastembed's default when unset.
    pub embedding_cache_dir: Option<PathBuf>,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let api_base_url = env::var("OPENAI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let completion_model =
            env::var("COMPLETION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let review_csv = env::var("REVIEW_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("sample_review.csv"));
        let similarity_threshold = match env::var("SIMILARITY_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .with_context(|| format!("parsing SIMILARITY_THRESHOLD={raw:?}"))?,
            Err(_) => DEFAULT_THRESHOLD,
        };
        let embedding_cache_dir = env::var("EMBEDDING_CACHE_DIR").ok().map(PathBuf::from);

        Ok(Self {
            api_key,
            api_base_url,
            completion_model,
            review_csv,
            similarity_threshold,
            embedding_cache_dir,
        })
    }

    /// The API key, or an error naming the variable to set.
    pub fn require_api_key(&self) -> anyhow::Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set (environment or .env)"))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("completion_model", &self.completion_model)
            .field("review_csv", &self.review_csv)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("embedding_cache_dir", &self.embedding_cache_dir)
            .finish()
    }
}
