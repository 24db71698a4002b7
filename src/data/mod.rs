//! Review data ingestion.

pub mod reviews;

pub use reviews::{load_first_review, load_reviews, read_reviews, DataError, ReviewRecord};
