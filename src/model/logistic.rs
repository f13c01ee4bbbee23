//! Logistic regression scorer
//!
//! Features are standardized with the scaler fitted at training time, then
//! combined linearly and passed through the logistic function.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::WinProbabilityModel;
use crate::features::FeatureVector;
use crate::{GridironError, Result};

/// Per-feature standardization: (x - mean) / scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Scaler that leaves features unchanged
    pub fn identity() -> Self {
        StandardScaler {
            mean: vec![0.0; FeatureVector::DIM],
            scale: vec![1.0; FeatureVector::DIM],
        }
    }

    pub fn transform(&self, features: &[f64; FeatureVector::DIM]) -> [f64; FeatureVector::DIM] {
        let mut out = [0.0; FeatureVector::DIM];
        for (i, x) in features.iter().enumerate() {
            out[i] = (x - self.mean[i]) / self.scale[i];
        }
        out
    }
}

/// What the model was trained on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub trained_on_seasons: Vec<i32>,
    #[serde(default)]
    pub total_games: Option<usize>,
    #[serde(default)]
    pub test_accuracy: Option<f64>,
    /// Feature column names, in model input order
    #[serde(default)]
    pub features: Vec<String>,
}

/// Logistic regression over the seven matchup features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub scaler: StandardScaler,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, scaler: StandardScaler) -> Result<Self> {
        let model = LogisticModel {
            coefficients,
            intercept,
            scaler,
            metadata: ModelMetadata::default(),
        };
        model.validate()?;
        Ok(model)
    }

    /// Load an exported model
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GridironError::NoModel);
        }
        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json(&content)?;
        log::debug!(
            "Loaded model from {} (trained on seasons {:?})",
            path.display(),
            model.metadata.trained_on_seasons
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: LogisticModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Check dimensions and scales against the feature layout
    pub fn validate(&self) -> Result<()> {
        let dim = FeatureVector::DIM;
        if self.coefficients.len() != dim {
            return Err(GridironError::Model(format!(
                "expected {} coefficients, found {}",
                dim,
                self.coefficients.len()
            )));
        }
        if self.scaler.mean.len() != dim || self.scaler.scale.len() != dim {
            return Err(GridironError::Model(format!(
                "scaler must have {} means and scales",
                dim
            )));
        }
        if let Some(i) = self
            .scaler
            .scale
            .iter()
            .position(|s| *s == 0.0 || !s.is_finite())
        {
            return Err(GridironError::Model(format!(
                "invalid scale for feature {}",
                FeatureVector::COLUMNS[i]
            )));
        }
        if !self.metadata.features.is_empty()
            && self.metadata.features.iter().map(String::as_str).ne(FeatureVector::COLUMNS)
        {
            return Err(GridironError::Model(format!(
                "model features {:?} do not match {:?}",
                self.metadata.features,
                FeatureVector::COLUMNS
            )));
        }
        Ok(())
    }

    /// Linear score before the logistic function
    pub fn decision_function(&self, features: &[f64; FeatureVector::DIM]) -> f64 {
        let scaled = self.scaler.transform(features);
        self.intercept
            + scaled
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }
}

impl WinProbabilityModel for LogisticModel {
    fn home_win_probability(&self, features: &[f64; FeatureVector::DIM]) -> Result<f64> {
        let z = self.decision_function(features);
        if !z.is_finite() {
            return Err(GridironError::Model(format!(
                "non-finite score for features {:?}",
                features
            )));
        }
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}
