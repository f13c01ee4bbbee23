//! Feature extraction
//!
//! Converts completed games into leakage-free team statistics and model-ready
//! feature vectors.

pub mod derive;
pub mod engine;
pub mod league;
pub mod match_repr;
pub mod team_stats;

pub use derive::{derive, TeamStatistics};
pub use engine::{FeatureEngine, FeatureRow, FeatureTable, Matchup};
pub use league::league_average;
pub use match_repr::FeatureVector;
pub use team_stats::{TeamHistoryTracker, TeamSnapshot};
