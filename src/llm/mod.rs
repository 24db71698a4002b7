//! Chat completion abstraction used by the extraction stage.
//!
//! [`CompletionBackend`] is the seam between prompt logic and transport: the
//! pipeline only ever sees a message list going in and the first choice's text
//! coming out, so tests can swap in a scripted backend.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use openai::OpenAiClient;

/// Chat model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

/// Speaker of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Response format requested from the model.
///
/// `JsonObject` asks the API for a JSON body but does not guarantee one; callers
/// parse and report failures themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub model: String,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub n: u32,
    pub response_format: ResponseFormat,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            frequency_penalty: 0.0,
            n: 1,
            response_format: ResponseFormat::Text,
        }
    }
}

impl SamplingParams {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion response contained no choices")]
    NoChoices,

    #[error("first completion choice has no text content")]
    EmptyContent,
}

/// Anything that can turn a transcript into the text of one completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue a single request and return the first choice's content.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<String, CompletionError>;
}
