//! Prediction and inference
//!
//! Load the feature table and a trained model and score a matchup.

pub mod inference;

pub use inference::{format_prediction, pick_model, Predictor, TotalPrediction};
