//! Basketball total-points prediction
//!
//! Builds leak-free rolling team features from historical game results and
//! trains a regression model on the combined final score of a matchup.

pub mod data;
pub mod features;
pub mod predict;
pub mod training;

#[cfg(test)]
pub(crate) mod testing;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Opaque team identifier as issued by the results feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        TeamId(id.to_string())
    }
}

/// Opaque event identifier, used to order games that share a date.
///
/// Decimal integer identifiers come first in numeric order, then everything
/// else in text order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    fn numeric(&self) -> Option<u64> {
        self.0.trim().parse().ok()
    }
}

impl Ord for EventId {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.numeric(), other.numeric());
        (a.is_none(), a, &self.0).cmp(&(b.is_none(), b, &other.0))
    }
}

impl PartialOrd for EventId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single completed game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub event_id: EventId,
    pub date: Option<NaiveDate>,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_name: String,
    pub away_name: String,
    pub home_pts: u32,
    pub away_pts: u32,
}

impl Game {
    /// Combined final score
    pub fn total_points(&self) -> u64 {
        u64::from(self.home_pts) + u64::from(self.away_pts)
    }

    /// Check whether a team took part in this game
    pub fn involves(&self, team: &TeamId) -> bool {
        &self.home_id == team || &self.away_id == team
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Events API returned an unusable response for page {page}: {message}")]
    Api { page: u32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "No historical data found for team '{team}'.\n\
         Tip: team names must match exactly what appears in the feature table.\n\
         Example valid names: {} ...",
        examples.join(", ")
    )]
    UnknownTeam { team: String, examples: Vec<String> },

    #[error("No saved models found - run `hoops train` first")]
    NoModel,

    #[error("Model fit failed: {0}")]
    Fit(#[from] linfa_elasticnet::ElasticNetError),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Feature schema mismatch: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Application configuration loaded from hoops.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Falls back to the BETS_API_TOKEN environment variable when unset
    pub token: Option<String>,
    pub sport_id: u32,
    pub league_id: u32,
    pub timeout_secs: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub window: usize,
    pub min_games: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub test_ratio: f64,
    pub ridge_alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub raw_dir: String,
    pub processed_dir: String,
    pub models_dir: String,
}

impl DataConfig {
    pub fn games_path(&self) -> PathBuf {
        PathBuf::from(&self.processed_dir).join("games.csv")
    }

    pub fn features_path(&self) -> PathBuf {
        PathBuf::from(&self.processed_dir).join("features.csv")
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "https://api.b365api.com/".to_string(),
                token: None,
                sport_id: 18,
                league_id: 2274,
                timeout_secs: 15,
                pages: 20,
            },
            features: FeatureConfig {
                window: 10,
                min_games: 5,
            },
            training: TrainingConfig {
                test_ratio: 0.2,
                ridge_alpha: 1.0,
            },
            data: DataConfig {
                raw_dir: "data/raw".to_string(),
                processed_dir: "data/processed".to_string(),
                models_dir: "models".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// API token from the config file, else from the environment
    pub fn api_token(&self) -> Option<String> {
        self.api
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("BETS_API_TOKEN").ok().filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_numeric_order() {
        let mut ids = vec![
            EventId("100".to_string()),
            EventId("99".to_string()),
            EventId("1000".to_string()),
        ];
        ids.sort();
        let ordered: Vec<_> = ids.iter().map(|id| id.0.as_str()).collect();
        assert_eq!(ordered, vec!["99", "100", "1000"]);
    }

    #[test]
    fn test_event_id_text_fallback() {
        assert!(EventId("abc".to_string()) < EventId("abd".to_string()));
        assert!(EventId("9".to_string()) < EventId("10x".to_string()));
    }

    #[test]
    fn test_event_id_mixed_order_is_total() {
        // 9 < 10 numerically while "10" < "1a" < "9" as text
        let nine = EventId("9".to_string());
        let ten = EventId("10".to_string());
        let text = EventId("1a".to_string());
        assert!(nine < ten);
        assert!(ten < text);
        assert!(nine < text);

        let mut ids: Vec<EventId> = (0..200)
            .map(|i| match i % 3 {
                0 => EventId(format!("{}", i)),
                1 => EventId(format!("{}a", i)),
                _ => EventId(format!("x{}", 199 - i)),
            })
            .collect();
        ids.sort();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));

        let split = ids.iter().position(|id| id.numeric().is_none()).unwrap();
        assert!(ids[..split].iter().all(|id| id.numeric().is_some()));
        assert!(ids[split..].iter().all(|id| id.numeric().is_none()));
        assert_eq!(ids[0].0, "0");
        assert_eq!(ids[split - 1].0, "198");
    }

    #[test]
    fn test_total_points_does_not_overflow() {
        let game = crate::testing::make_game(0, "A", "B", u32::MAX, 1);
        assert_eq!(game.total_points(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.features.window, 10);
        assert_eq!(parsed.features.min_games, 5);
        assert_eq!(parsed.api.sport_id, 18);
        assert_eq!(parsed.api.league_id, 2274);
        assert!(parsed.api.token.is_none());
    }

    #[test]
    fn test_unknown_team_message_lists_examples() {
        let err = HoopsError::UnknownTeam {
            team: "Nowhere".to_string(),
            examples: vec!["Boston Celtics".to_string(), "Chicago Bulls".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Nowhere'"));
        assert!(msg.contains("Boston Celtics, Chicago Bulls"));
    }
}
