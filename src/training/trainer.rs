//! Time-ordered model selection
//!
//! Splits the feature table by position (the most recent rows are the
//! holdout), fits every candidate on the older rows and keeps the one with
//! the lowest holdout MAE.

use std::path::{Path, PathBuf};

use super::metrics::Metrics;
use super::models::{ModelArtifact, TotalsModel};
use crate::features::{FeatureRow, FeatureVector};
use crate::{HoopsError, Result, TrainingConfig};

/// Candidate regressors, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Candidate {
    BaselineMean,
    Ridge { alpha: f64 },
}

impl Candidate {
    pub fn fit(&self, x: &[FeatureVector], y: &[f64]) -> Result<TotalsModel> {
        match *self {
            Candidate::BaselineMean => TotalsModel::fit_baseline(y),
            Candidate::Ridge { alpha } => TotalsModel::fit_ridge(x, y, alpha),
        }
    }
}

/// Holdout score of one candidate
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub method: &'static str,
    pub metrics: Metrics,
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Rows dropped for a missing label or non-finite feature
    pub dropped_rows: usize,
    pub results: Vec<CandidateResult>,
    pub best: ModelArtifact,
    pub best_metrics: Metrics,
    pub saved_to: Option<PathBuf>,
}

/// Model trainer with a chronological holdout
pub struct Trainer {
    test_ratio: f64,
    candidates: Vec<Candidate>,
}

impl Trainer {
    pub fn new(test_ratio: f64, ridge_alpha: f64) -> Result<Self> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(HoopsError::Config(format!(
                "test_ratio must be between 0 and 1, got {}",
                test_ratio
            )));
        }
        if ridge_alpha.is_nan() || ridge_alpha < 0.0 {
            return Err(HoopsError::Config(format!(
                "ridge_alpha must be non-negative, got {}",
                ridge_alpha
            )));
        }
        Ok(Trainer {
            test_ratio,
            candidates: vec![
                Candidate::BaselineMean,
                Candidate::Ridge { alpha: ridge_alpha },
            ],
        })
    }

    pub fn from_config(config: &TrainingConfig) -> Result<Self> {
        Self::new(config.test_ratio, config.ridge_alpha)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Model-ready samples, skipping rows with a missing label or a
    /// non-finite feature. Row order is preserved.
    pub fn prepare(rows: &[FeatureRow]) -> Vec<(FeatureVector, f64)> {
        rows.iter()
            .filter_map(|row| {
                let x = row.features();
                let y = row.y_total?;
                x.is_finite().then_some((x, y as f64))
            })
            .collect()
    }

    /// Index of the first holdout row
    pub fn split_index(&self, len: usize) -> usize {
        (len as f64 * (1.0 - self.test_ratio)) as usize
    }

    /// Fit and evaluate every candidate; nothing is written to disk
    pub fn train(&self, rows: &[FeatureRow]) -> Result<TrainingReport> {
        let samples = Self::prepare(rows);
        let dropped_rows = rows.len() - samples.len();
        if dropped_rows > 0 {
            log::warn!("Dropped {} rows with missing values", dropped_rows);
        }

        let split = self.split_index(samples.len());
        let (train, test) = samples.split_at(split);
        if train.is_empty() || test.is_empty() {
            return Err(HoopsError::InsufficientData(format!(
                "{} usable rows give {} training and {} holdout rows; build more features first",
                samples.len(),
                train.len(),
                test.len()
            )));
        }
        log::info!("Training on {} rows, holding out the last {}", train.len(), test.len());

        let (x_train, y_train): (Vec<FeatureVector>, Vec<f64>) = train.iter().copied().unzip();
        let (x_test, y_test): (Vec<FeatureVector>, Vec<f64>) = test.iter().copied().unzip();

        let mut results = Vec::with_capacity(self.candidates.len());
        let mut best: Option<(TotalsModel, Metrics)> = None;

        for candidate in &self.candidates {
            let model = candidate.fit(&x_train, &y_train)?;
            let predictions: Vec<f64> = x_test.iter().map(|x| model.predict(x)).collect();
            let metrics = Metrics::evaluate(&predictions, &y_test);
            log::debug!("{}: {}", model.method(), metrics);

            results.push(CandidateResult {
                method: model.method(),
                metrics,
            });
            let improves = best
                .as_ref()
                .is_none_or(|(_, best_metrics)| metrics.mae < best_metrics.mae);
            if improves {
                best = Some((model, metrics));
            }
        }

        let (model, best_metrics) = best.ok_or_else(|| {
            HoopsError::InsufficientData("no candidate models configured".to_string())
        })?;

        Ok(TrainingReport {
            train_rows: train.len(),
            test_rows: test.len(),
            dropped_rows,
            results,
            best: ModelArtifact::new(model),
            best_metrics,
            saved_to: None,
        })
    }

    /// Train, then persist only the selected model under `models_dir`
    pub fn train_and_save(&self, rows: &[FeatureRow], models_dir: &Path) -> Result<TrainingReport> {
        let mut report = self.train(rows)?;
        let path = report.best.save(models_dir)?;
        log::info!("Saved {} model to {}", report.best.method(), path.display());
        report.saved_to = Some(path);
        Ok(report)
    }
}
