//! Holdout evaluation metrics

use std::fmt;

/// Error metrics for one model on the holdout partition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Number of holdout rows scored
    pub count: usize,
}

impl Metrics {
    /// Score predictions against targets of the same length
    pub fn evaluate(predictions: &[f64], targets: &[f64]) -> Self {
        debug_assert_eq!(predictions.len(), targets.len());
        let count = predictions.len().min(targets.len());
        if count == 0 {
            return Metrics {
                mae: 0.0,
                rmse: 0.0,
                count: 0,
            };
        }

        let (abs_sum, sq_sum) = predictions
            .iter()
            .zip(targets)
            .fold((0.0, 0.0), |(abs_sum, sq_sum), (p, t)| {
                let err = p - t;
                (abs_sum + err.abs(), sq_sum + err * err)
            });

        let n = count as f64;
        Metrics {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            count,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAE: {:6.2} | RMSE: {:6.2}", self.mae, self.rmse)
    }
}
