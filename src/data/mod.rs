//! Game storage and dataset preparation
//!
//! SQLite-backed game store plus validation of raw feed records.

pub mod database;
pub mod dataset;

pub use database::Database;
pub use dataset::{completed_matches, CompletedMatches, DatasetSummary};
