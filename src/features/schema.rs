//! Feature table schema
//!
//! The column layout shared by the rolling feature engine, the trainer and
//! the predictor. Training and inference both build their model input
//! through [`FeatureVector`], so the two can never disagree on column order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Game, TeamId};

/// Columns of the persisted feature table, in order
pub const TABLE_COLUMNS: [&str; 16] = [
    "date",
    "home_id",
    "away_id",
    "home_name",
    "away_name",
    "home_pf_roll",
    "home_pa_roll",
    "home_tot_roll",
    "home_n",
    "away_pf_roll",
    "away_pa_roll",
    "away_tot_roll",
    "away_n",
    "exp_total_mean",
    "exp_total_mix",
    "y_total",
];

/// Model input columns, in order
pub const FEATURE_COLUMNS: [&str; FeatureVector::DIM] = [
    "home_pf_roll",
    "home_pa_roll",
    "home_tot_roll",
    "home_n",
    "away_pf_roll",
    "away_pa_roll",
    "away_tot_roll",
    "away_n",
    "exp_total_mean",
    "exp_total_mix",
];

pub const LABEL_COLUMN: &str = "y_total";

/// Trailing-window aggregate for one team
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingStats {
    /// Mean points scored
    pub pf: f64,
    /// Mean points conceded
    pub pa: f64,
    /// Mean combined total
    pub tot: f64,
    /// Number of games in the window
    pub n: usize,
}

/// Matchup scalars derived from both teams' aggregates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchupScalars {
    pub exp_total_mean: f64,
    pub exp_total_mix: f64,
}

impl MatchupScalars {
    pub fn derive(home: &RollingStats, away: &RollingStats) -> Self {
        MatchupScalars {
            exp_total_mean: (home.tot + away.tot) / 2.0,
            exp_total_mix: (home.pf + home.pa + away.pf + away.pa) / 4.0,
        }
    }
}

/// Which side of a matchup a team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn name_column(&self) -> &'static str {
        match self {
            Side::Home => "home_name",
            Side::Away => "away_name",
        }
    }
}

/// One row of the feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: Option<NaiveDate>,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_name: String,
    pub away_name: String,
    pub home_pf_roll: f64,
    pub home_pa_roll: f64,
    pub home_tot_roll: f64,
    pub home_n: usize,
    pub away_pf_roll: f64,
    pub away_pa_roll: f64,
    pub away_tot_roll: f64,
    pub away_n: usize,
    pub exp_total_mean: f64,
    pub exp_total_mix: f64,
    pub y_total: Option<u64>,
}

impl FeatureRow {
    /// Build the row for a game from both teams' pre-game aggregates
    pub fn new(game: &Game, home: RollingStats, away: RollingStats) -> Self {
        let scalars = MatchupScalars::derive(&home, &away);
        FeatureRow {
            date: game.date,
            home_id: game.home_id.clone(),
            away_id: game.away_id.clone(),
            home_name: game.home_name.clone(),
            away_name: game.away_name.clone(),
            home_pf_roll: home.pf,
            home_pa_roll: home.pa,
            home_tot_roll: home.tot,
            home_n: home.n,
            away_pf_roll: away.pf,
            away_pa_roll: away.pa,
            away_tot_roll: away.tot,
            away_n: away.n,
            exp_total_mean: scalars.exp_total_mean,
            exp_total_mix: scalars.exp_total_mix,
            y_total: Some(game.total_points()),
        }
    }

    pub fn home_stats(&self) -> RollingStats {
        RollingStats {
            pf: self.home_pf_roll,
            pa: self.home_pa_roll,
            tot: self.home_tot_roll,
            n: self.home_n,
        }
    }

    pub fn away_stats(&self) -> RollingStats {
        RollingStats {
            pf: self.away_pf_roll,
            pa: self.away_pa_roll,
            tot: self.away_tot_roll,
            n: self.away_n,
        }
    }

    pub fn side_stats(&self, side: Side) -> RollingStats {
        match side {
            Side::Home => self.home_stats(),
            Side::Away => self.away_stats(),
        }
    }

    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_name,
            Side::Away => &self.away_name,
        }
    }

    /// Model input exactly as stored in the row
    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.home_pf_roll,
            self.home_pa_roll,
            self.home_tot_roll,
            self.home_n as f64,
            self.away_pf_roll,
            self.away_pa_roll,
            self.away_tot_roll,
            self.away_n as f64,
            self.exp_total_mean,
            self.exp_total_mix,
        ])
    }
}

/// Model input vector, ordered as [`FEATURE_COLUMNS`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FeatureVector::DIM]);

impl FeatureVector {
    pub const DIM: usize = 10;

    /// Assemble a vector from two sides' aggregates, recomputing the
    /// matchup scalars
    pub fn from_sides(home: &RollingStats, away: &RollingStats) -> Self {
        let scalars = MatchupScalars::derive(home, away);
        FeatureVector([
            home.pf,
            home.pa,
            home.tot,
            home.n as f64,
            away.pf,
            away.pa,
            away.tot,
            away.n as f64,
            scalars.exp_total_mean,
            scalars.exp_total_mix,
        ])
    }

    pub fn columns() -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}
