//! Prediction and inference
//!
//! Score upcoming matchups from stored results with a trained model.

pub mod inference;

pub use inference::{format_prediction, Predictor};
