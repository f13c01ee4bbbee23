//! Win probability scoring
//!
//! The scorer is an opaque function from a feature vector to the home team's
//! win probability. Training happens elsewhere; a logistic regression
//! exported as JSON is provided.

pub mod logistic;

pub use logistic::{LogisticModel, ModelMetadata, StandardScaler};

use crate::features::FeatureVector;
use crate::Result;

/// Scores a matchup feature vector
pub trait WinProbabilityModel {
    /// Probability (0-1) that the home team wins
    fn home_win_probability(&self, features: &[f64; FeatureVector::DIM]) -> Result<f64>;
}
