//! Model inference for total-points predictions

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::data::table::read_features;
use crate::features::{FeatureRow, FeatureVector, Side};
use crate::training::ModelArtifact;
use crate::{HoopsError, Result};

/// Model file tried before any other
pub const PREFERRED_MODEL: &str = "model_ridge.json";

/// How many valid names an unknown-team error lists
const NAME_EXAMPLES: usize = 20;

/// Persisted models in precedence order: the preferred file first, then
/// every other `model_*.json` sorted by name
pub fn model_candidates(models_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    let preferred = models_dir.join(PREFERRED_MODEL);
    if preferred.is_file() {
        candidates.push(preferred);
    }

    let entries = match std::fs::read_dir(models_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(candidates),
        Err(e) => return Err(e.into()),
    };

    let mut others = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_model = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("model_") && n.ends_with(".json") && n != PREFERRED_MODEL)
            .unwrap_or(false);
        if is_model && path.is_file() {
            others.push(path);
        }
    }
    others.sort();
    candidates.extend(others);
    Ok(candidates)
}

/// First persisted model by precedence
pub fn pick_model(models_dir: &Path) -> Result<PathBuf> {
    model_candidates(models_dir)?
        .into_iter()
        .next()
        .ok_or(HoopsError::NoModel)
}

/// Sorted distinct team names from both side columns
pub fn team_names(rows: &[FeatureRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| [r.home_name.as_str(), r.away_name.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Most recent row in which `team` played on the given side
pub fn latest_side_row<'a>(rows: &'a [FeatureRow], team: &str, side: Side) -> Result<&'a FeatureRow> {
    rows.iter()
        .rev()
        .find(|r| r.team_name(side) == team)
        .ok_or_else(|| HoopsError::UnknownTeam {
            team: team.to_string(),
            examples: team_names(rows).into_iter().take(NAME_EXAMPLES).collect(),
        })
}

/// Predicted combined score for a matchup
#[derive(Debug, Clone, Serialize)]
pub struct TotalPrediction {
    pub home: String,
    pub away: String,
    pub total: f64,
    pub method: String,
    /// Games behind each side's rolling aggregate
    pub home_n: usize,
    pub away_n: usize,
}

/// Predictor for scoring matchups from the feature table
pub struct Predictor {
    rows: Vec<FeatureRow>,
    model: ModelArtifact,
}

impl Predictor {
    pub fn new(rows: Vec<FeatureRow>, model: ModelArtifact) -> Self {
        Predictor { rows, model }
    }

    /// Load the feature table and a model, either the given file or the
    /// first persisted candidate under `models_dir`
    pub fn load(features_path: &Path, models_dir: &Path, model_path: Option<&Path>) -> Result<Self> {
        let rows = read_features(features_path)?;
        let model_file = match model_path {
            Some(path) => path.to_path_buf(),
            None => pick_model(models_dir)?,
        };
        log::info!("Using model {}", model_file.display());
        let model = ModelArtifact::load(&model_file)?;
        Ok(Self::new(rows, model))
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    /// Feature vector from the home team's latest home-side aggregates and
    /// the away team's latest away-side aggregates
    pub fn feature_vector(&self, home: &str, away: &str) -> Result<FeatureVector> {
        let home_row = latest_side_row(&self.rows, home, Side::Home)?;
        let away_row = latest_side_row(&self.rows, away, Side::Away)?;
        Ok(FeatureVector::from_sides(
            &home_row.home_stats(),
            &away_row.away_stats(),
        ))
    }

    pub fn predict(&self, home: &str, away: &str) -> Result<TotalPrediction> {
        let x = self.feature_vector(home, away)?;
        let total = self.model.predict(&x);
        log::debug!("{} vs {}: features {:?} -> {:.2}", home, away, x.as_slice(), total);

        Ok(TotalPrediction {
            home: home.to_string(),
            away: away.to_string(),
            total,
            method: self.model.method().to_string(),
            home_n: x.0[3] as usize,
            away_n: x.0[7] as usize,
        })
    }
}

/// Format a prediction for display
pub fn format_prediction(pred: &TotalPrediction) -> String {
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}
├─────────────────────────────────────────────────┤
│  Predicted total points:  {:.1}
│  Model:                   {}
│  Form window:             {} / {} games
└─────────────────────────────────────────────────┘
"#,
        pred.home, pred.away, pred.total, pred.method, pred.home_n, pred.away_n
    )
}
