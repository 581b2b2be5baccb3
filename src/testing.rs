//! Shared fixtures for unit tests

use crate::{EventId, Game, TeamId};
use chrono::{Days, NaiveDate};

/// A game dated `id` days after 2024-01-01, with team names equal to their ids
pub fn make_game(id: u32, home: &str, away: &str, home_pts: u32, away_pts: u32) -> Game {
    Game {
        event_id: EventId(id.to_string()),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).map(|d| d + Days::new(u64::from(id))),
        home_id: TeamId::from(home),
        away_id: TeamId::from(away),
        home_name: home.to_string(),
        away_name: away.to_string(),
        home_pts,
        away_pts,
    }
}
