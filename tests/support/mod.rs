#![allow(dead_code)]

use std::sync::Mutex;

use aspect_eval::{
    llm::{ChatMessage, CompletionBackend, CompletionError, SamplingParams},
    nlp::embeddings::{EmbeddingError, Embedder},
};
use async_trait::async_trait;

/// Completion backend that returns a fixed body and records every request.
pub struct ScriptedBackend {
    pub response: Result<String, (u16, String)>,
    pub requests: Mutex<Vec<(Vec<ChatMessage>, SamplingParams)>>,
}

impl ScriptedBackend {
    pub fn replying(body: &str) -> Self {
        Self {
            response: Ok(body.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            response: Err((status, message.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> (Vec<ChatMessage>, SamplingParams) {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("at least one request")
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<String, CompletionError> {
        self.requests
            .lock()
            .unwrap()
            .push((messages.to_vec(), params.clone()));
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err((status, message)) => Err(CompletionError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// Deterministic bag-of-words embedder: each lowercase token adds 1 to a hashed slot.
///
/// Identical texts embed identically; texts without shared tokens are (almost always) orthogonal.
#[derive(Default)]
pub struct HashingEmbedder {
    pub calls: usize,
}

const DIM: usize = 64;

impl Embedder for HashingEmbedder {
    fn embed(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls += 1;
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; DIM];
                for token in text.split_whitespace() {
                    vector[slot(&token.to_lowercase())] += 1.0;
                }
                vector
            })
            .collect())
    }
}

fn slot(token: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % DIM as u64) as usize
}

/// Embedder that always fails, for error propagation tests.
pub struct BrokenEmbedder;

impl Embedder for BrokenEmbedder {
    fn embed(&mut self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Model("model file missing".into()))
    }
}
