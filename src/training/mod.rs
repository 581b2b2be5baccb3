//! Model training
//!
//! Candidate regressors, holdout metrics and chronological model selection.

pub mod metrics;
pub mod models;
pub mod trainer;

pub use metrics::Metrics;
pub use models::{ModelArtifact, TotalsModel};
pub use trainer::{Candidate, CandidateResult, Trainer, TrainingReport};
