//! Total-points regressors and their persisted form

use linfa::prelude::*;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::features::FeatureVector;
use crate::{HoopsError, Result};

const RIDGE_MAX_ITERATIONS: u32 = 20_000;
const RIDGE_TOLERANCE: f64 = 1e-10;

/// A fitted regressor, tagged by the method that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum TotalsModel {
    /// Predicts the training label mean for every input
    BaselineMean { mean: f64 },
    /// L2-regularized linear regression with an unpenalized intercept
    Ridge {
        alpha: f64,
        intercept: f64,
        coefficients: Vec<f64>,
    },
}

impl TotalsModel {
    pub fn method(&self) -> &'static str {
        match self {
            TotalsModel::BaselineMean { .. } => "baseline_mean",
            TotalsModel::Ridge { .. } => "ridge",
        }
    }

    pub fn predict(&self, x: &FeatureVector) -> f64 {
        match self {
            TotalsModel::BaselineMean { mean } => *mean,
            TotalsModel::Ridge {
                intercept,
                coefficients,
                ..
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(x.as_slice())
                        .map(|(w, v)| w * v)
                        .sum::<f64>()
            }
        }
    }

    pub fn fit_baseline(y: &[f64]) -> Result<Self> {
        if y.is_empty() {
            return Err(HoopsError::InsufficientData(
                "cannot fit a baseline on zero rows".to_string(),
            ));
        }
        Ok(TotalsModel::BaselineMean {
            mean: y.iter().sum::<f64>() / y.len() as f64,
        })
    }

    /// Ridge fit minimizing `‖y − Xw − b‖² + α‖w‖²`.
    ///
    /// Solved by coordinate descent as an elastic net with no L1 part. That
    /// objective averages the squared error over the rows, so the penalty
    /// handed to it is `α / n`.
    pub fn fit_ridge(x: &[FeatureVector], y: &[f64], alpha: f64) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(HoopsError::InsufficientData(format!(
                "ridge needs matching non-empty inputs, got {} rows and {} labels",
                x.len(),
                y.len()
            )));
        }

        let xm = Array2::from_shape_fn((x.len(), FeatureVector::DIM), |(i, j)| x[i].0[j]);
        let x_mean = xm
            .mean_axis(Axis(0))
            .ok_or_else(|| HoopsError::InsufficientData("empty design matrix".to_string()))?;
        let dataset = Dataset::new(&xm - &x_mean, Array1::from_iter(y.iter().copied()));

        let fitted = ElasticNet::params()
            .l1_ratio(0.0)
            .penalty(alpha / x.len() as f64)
            .max_iterations(RIDGE_MAX_ITERATIONS)
            .tolerance(RIDGE_TOLERANCE)
            .fit(&dataset)?;

        let coefficients = fitted.hyperplane().to_vec();
        let intercept = fitted.intercept() - x_mean.dot(fitted.hyperplane());

        Ok(TotalsModel::Ridge {
            alpha,
            intercept,
            coefficients,
        })
    }
}

/// A model together with the feature columns it was fitted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_columns: Vec<String>,
    #[serde(flatten)]
    pub model: TotalsModel,
}

impl ModelArtifact {
    pub fn new(model: TotalsModel) -> Self {
        ModelArtifact {
            feature_columns: FeatureVector::columns(),
            model,
        }
    }

    pub fn method(&self) -> &'static str {
        self.model.method()
    }

    pub fn predict(&self, x: &FeatureVector) -> f64 {
        self.model.predict(x)
    }

    /// Conventional file name for a method, e.g. `model_ridge.json`
    pub fn file_name(method: &str) -> String {
        format!("model_{}.json", method)
    }

    /// Write to `<dir>/model_<method>.json` and return the path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(self.method()));
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Load an artifact and check it matches the current feature schema
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;

        if artifact.feature_columns != FeatureVector::columns() {
            return Err(HoopsError::Schema(format!(
                "{} was trained on columns [{}], expected [{}]",
                path.display(),
                artifact.feature_columns.join(", "),
                FeatureVector::columns().join(", ")
            )));
        }
        if let TotalsModel::Ridge { coefficients, .. } = &artifact.model {
            if coefficients.len() != FeatureVector::DIM {
                return Err(HoopsError::Schema(format!(
                    "{} has {} coefficients, expected {}",
                    path.display(),
                    coefficients.len(),
                    FeatureVector::DIM
                )));
            }
        }
        Ok(artifact)
    }
}
