//! CSV loading for labelled customer reviews.

use std::{io::Read, path::Path};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const REQUIRED_COLUMNS: [&str; 3] = ["review", "true_entity", "true_aspect"];

/// One labelled review: the text plus its ground-truth entity and aspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review: String,
    pub true_entity: String,
    pub true_aspect: String,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("reading review csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("review csv is missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("review csv has no data rows")]
    Empty,
}

/// Read every row of a review CSV. Extra columns are ignored.
pub fn load_reviews<P: AsRef<Path>>(path: P) -> Result<Vec<ReviewRecord>, DataError> {
    let path = path.as_ref();
    let records = read_records(csv_builder().from_path(path)?)?;
    info!(path = %path.display(), rows = records.len(), "loaded review csv");
    Ok(records)
}

/// Read the first row of a review CSV, the only one a pipeline run evaluates.
pub fn load_first_review<P: AsRef<Path>>(path: P) -> Result<ReviewRecord, DataError> {
    load_reviews(path)?.into_iter().next().ok_or(DataError::Empty)
}

/// Parse review rows from any reader, e.g. an in-memory fixture.
pub fn read_reviews<R: Read>(input: R) -> Result<Vec<ReviewRecord>, DataError> {
    read_records(csv_builder().from_reader(input))
}

fn csv_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).trim(Trim::Headers);
    builder
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<ReviewRecord>, DataError> {
    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(DataError::MissingColumn(*missing));
    }
    reader
        .deserialize::<ReviewRecord>()
        .map(|row| row.map_err(DataError::from))
        .collect()
}
