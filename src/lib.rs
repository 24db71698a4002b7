//! Entity/aspect extraction from customer reviews with an LLM, scored against
//! ground-truth labels by sentence-embedding similarity.

pub mod cli;
pub mod config;
pub mod data;
pub mod llm;
pub mod logging;
pub mod nlp;

pub use data::ReviewRecord;
pub use nlp::{
    evaluation::{Evaluation, Evaluator, NonePolicy},
    extraction::{Extractor, Prediction},
    run_from_csv, run_pipeline, PipelineReport,
};
