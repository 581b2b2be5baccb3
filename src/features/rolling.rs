//! Rolling team statistics
//!
//! Walks games in chronological order and emits one [`FeatureRow`] per game
//! whose two teams both have enough prior history. A game is only added to
//! the histories after its own row has been computed, so every aggregate is
//! built from strictly earlier games.

use std::collections::HashMap;

use super::schema::{FeatureRow, RollingStats};
use crate::{Game, HoopsError, Result, TeamId};

/// Window settings for the rolling aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingConfig {
    /// Maximum number of most recent prior games aggregated per team
    pub window: usize,
    /// Minimum number of prior games before a team is eligible
    pub min_games: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        RollingConfig {
            window: 10,
            min_games: 5,
        }
    }
}

impl RollingConfig {
    pub fn new(window: usize, min_games: usize) -> Self {
        RollingConfig { window, min_games }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(HoopsError::Config("window must be at least 1".to_string()));
        }
        if self.min_games > self.window {
            return Err(HoopsError::Config(format!(
                "min_games ({}) cannot exceed window ({}); no row would ever be produced",
                self.min_games, self.window
            )));
        }
        Ok(())
    }
}

/// A game result from one team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub points_for: u32,
    pub points_against: u32,
    pub total: u64,
}

/// Per-team append-only game log
#[derive(Debug, Clone, Default)]
pub struct TeamHistory {
    outcomes: HashMap<TeamId, Vec<Outcome>>,
}

impl TeamHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished game for both participants
    pub fn record(&mut self, game: &Game) {
        let total = game.total_points();
        self.outcomes
            .entry(game.home_id.clone())
            .or_default()
            .push(Outcome {
                points_for: game.home_pts,
                points_against: game.away_pts,
                total,
            });
        self.outcomes
            .entry(game.away_id.clone())
            .or_default()
            .push(Outcome {
                points_for: game.away_pts,
                points_against: game.home_pts,
                total,
            });
    }

    /// All recorded outcomes for a team, oldest first
    pub fn outcomes(&self, team: &TeamId) -> &[Outcome] {
        self.outcomes.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of games recorded for a team
    pub fn len(&self, team: &TeamId) -> usize {
        self.outcomes(team).len()
    }

    pub fn team_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Aggregate over the trailing window, or `None` if the team is not yet
    /// eligible. A team without history is never eligible.
    pub fn trailing(&self, team: &TeamId, config: &RollingConfig) -> Option<RollingStats> {
        let all = self.outcomes(team);
        let tail = &all[all.len().saturating_sub(config.window)..];
        if tail.is_empty() || tail.len() < config.min_games {
            return None;
        }

        let n = tail.len() as f64;
        let (pf, pa, tot) = tail.iter().fold((0u64, 0u64, 0u64), |(pf, pa, tot), o| {
            (
                pf + o.points_for as u64,
                pa + o.points_against as u64,
                tot + o.total,
            )
        });

        Some(RollingStats {
            pf: pf as f64 / n,
            pa: pa as f64 / n,
            tot: tot as f64 / n,
            n: tail.len(),
        })
    }
}

/// Single-pass feature builder over a chronologically ordered game stream
pub struct RollingFeatureEngine {
    config: RollingConfig,
    history: TeamHistory,
}

impl RollingFeatureEngine {
    pub fn new(config: RollingConfig) -> Self {
        RollingFeatureEngine {
            config,
            history: TeamHistory::new(),
        }
    }

    /// Process the next game. Returns its row when both teams are eligible;
    /// the game is recorded either way.
    pub fn process(&mut self, game: &Game) -> Option<FeatureRow> {
        let home = self.history.trailing(&game.home_id, &self.config);
        let away = self.history.trailing(&game.away_id, &self.config);

        let row = match (home, away) {
            (Some(home), Some(away)) => Some(FeatureRow::new(game, home, away)),
            _ => None,
        };

        self.history.record(game);
        row
    }

    pub fn history(&self) -> &TeamHistory {
        &self.history
    }

    pub fn config(&self) -> &RollingConfig {
        &self.config
    }
}

/// Build the feature table for games sorted ascending by date
pub fn build_rolling_features(games: &[Game], config: RollingConfig) -> Vec<FeatureRow> {
    let mut engine = RollingFeatureEngine::new(config);
    let rows: Vec<FeatureRow> = games.iter().filter_map(|g| engine.process(g)).collect();
    log::info!(
        "Built {} feature rows from {} games ({} teams, window={}, min_games={})",
        rows.len(),
        games.len(),
        engine.history().team_count(),
        config.window,
        config.min_games
    );
    rows
}
