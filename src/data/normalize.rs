//! Raw event normalization
//!
//! Converts loosely-typed feed records into [`Game`]s and puts them in
//! chronological order.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::score::parse_score;
use crate::{EventId, Game, TeamId};

/// One page of the ended-events endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsPage {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<RawEvent>>,
}

impl EventsPage {
    /// The feed reports failures with `"success": 0` and an error code
    pub fn failure(&self) -> Option<String> {
        let failed = match &self.success {
            Some(Value::Number(n)) => n.as_i64() == Some(0),
            Some(Value::Bool(b)) => !b,
            _ => false,
        };
        failed.then(|| self.error.clone().unwrap_or_else(|| "unknown error".to_string()))
    }

    pub fn into_results(self) -> Vec<RawEvent> {
        self.results.unwrap_or_default()
    }
}

/// A match record as returned by the results feed.
///
/// Identifiers and timestamps arrive as either strings or numbers, so they
/// are kept as raw JSON values until normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub ss: Option<String>,
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub home: Option<RawTeam>,
    #[serde(default)]
    pub away: Option<RawTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Render a string-or-number JSON value as text
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn team_parts(team: Option<&RawTeam>) -> Option<(TeamId, String)> {
    let team = team?;
    let id = value_text(team.id.as_ref()?)?;
    let name = team
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());
    Some((TeamId(id), name))
}

fn event_date(time: Option<&Value>) -> Option<chrono::NaiveDate> {
    let secs: i64 = match time? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Normalize one raw record, or `None` when it has no usable score or teams
pub fn normalize_event(event: &RawEvent) -> Option<Game> {
    let (home_pts, away_pts) = parse_score(event.ss.as_deref()?)?;
    let (home_id, home_name) = team_parts(event.home.as_ref())?;
    let (away_id, away_name) = team_parts(event.away.as_ref())?;
    let event_id = event
        .id
        .as_ref()
        .and_then(value_text)
        .unwrap_or_default();

    Some(Game {
        event_id: EventId(event_id),
        date: event_date(event.time.as_ref()),
        home_id,
        away_id,
        home_name,
        away_name,
        home_pts,
        away_pts,
    })
}

/// Normalize a batch of records, silently dropping unusable ones
pub fn normalize_events(events: &[RawEvent]) -> Vec<Game> {
    let games: Vec<Game> = events.iter().filter_map(normalize_event).collect();
    let dropped = events.len() - games.len();
    if dropped > 0 {
        log::debug!("Dropped {} of {} records without a usable score", dropped, events.len());
    }
    games
}

/// Put games in chronological order.
///
/// When any game is dated, undated games are dropped and the rest are sorted
/// by `(date, event_id)`. When none are dated, event id order is used.
/// Repeated event ids keep their first occurrence.
pub fn sort_games(games: Vec<Game>) -> Vec<Game> {
    let mut seen = HashSet::new();
    let mut games: Vec<Game> = games
        .into_iter()
        .filter(|g| g.event_id.0.is_empty() || seen.insert(g.event_id.clone()))
        .collect();

    if games.iter().any(|g| g.date.is_some()) {
        let before = games.len();
        games.retain(|g| g.date.is_some());
        if games.len() < before {
            log::warn!("Dropped {} games without a date", before - games.len());
        }
        games.sort_by(|a, b| (a.date, &a.event_id).cmp(&(b.date, &b.event_id)));
    } else {
        games.sort_by(|a, b| a.event_id.cmp(&b.event_id));
    }

    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn raw(value: Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    fn game(id: &str, date: Option<NaiveDate>) -> Game {
        Game {
            event_id: EventId(id.to_string()),
            date,
            home_id: TeamId::from("1"),
            away_id: TeamId::from("2"),
            home_name: "A".to_string(),
            away_name: "B".to_string(),
            home_pts: 100,
            away_pts: 90,
        }
    }

    #[test]
    fn test_normalize_full_record() {
        let event = raw(json!({
            "id": "8812345",
            "ss": "112-104",
            "time": "1700000000",
            "home": {"id": "123", "name": "Boston Celtics"},
            "away": {"id": 456, "name": "Chicago Bulls"}
        }));
        let g = normalize_event(&event).unwrap();
        assert_eq!(g.event_id, EventId("8812345".to_string()));
        assert_eq!(g.date, NaiveDate::from_ymd_opt(2023, 11, 14));
        assert_eq!(g.home_id, TeamId::from("123"));
        assert_eq!(g.away_id, TeamId::from("456"));
        assert_eq!(g.home_name, "Boston Celtics");
        assert_eq!(g.away_name, "Chicago Bulls");
        assert_eq!((g.home_pts, g.away_pts), (112, 104));
        assert_eq!(g.total_points(), 216);
    }

    #[test]
    fn test_normalize_numeric_timestamp() {
        let event = raw(json!({
            "id": 1, "ss": "90-80", "time": 1700000000,
            "home": {"id": 1, "name": "A"}, "away": {"id": 2, "name": "B"}
        }));
        assert_eq!(
            normalize_event(&event).unwrap().date,
            NaiveDate::from_ymd_opt(2023, 11, 14)
        );
    }

    #[test]
    fn test_bad_timestamp_keeps_game() {
        let event = raw(json!({
            "id": 1, "ss": "90-80", "time": "soon",
            "home": {"id": 1, "name": "A"}, "away": {"id": 2, "name": "B"}
        }));
        let g = normalize_event(&event).unwrap();
        assert!(g.date.is_none());
    }

    #[test]
    fn test_unparseable_score_drops_record() {
        let events = vec![
            raw(json!({"id": 1, "ss": "90-80", "home": {"id": 1}, "away": {"id": 2}})),
            raw(json!({"id": 2, "ss": "postponed", "home": {"id": 1}, "away": {"id": 2}})),
            raw(json!({"id": 3, "home": {"id": 1}, "away": {"id": 2}})),
            raw(json!({"id": 4, "ss": "90-80", "home": {"name": "A"}, "away": {"id": 2}})),
        ];
        let games = normalize_events(&events);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].event_id, EventId("1".to_string()));
        // Missing names fall back to the team id
        assert_eq!(games[0].home_name, "1");
    }

    #[test]
    fn test_page_deserializes_without_results() {
        let page: EventsPage = serde_json::from_value(json!({"success": 1})).unwrap();
        assert!(page.into_results().is_empty());
    }

    #[test]
    fn test_page_failure_detection() {
        let page: EventsPage =
            serde_json::from_value(json!({"success": 0, "error": "TOKEN_INVALID"})).unwrap();
        assert_eq!(page.failure().as_deref(), Some("TOKEN_INVALID"));
        let ok: EventsPage = serde_json::from_value(json!({"success": 1, "results": []})).unwrap();
        assert!(ok.failure().is_none());
    }

    #[test]
    fn test_sort_by_date_then_id() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1);
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2);
        let games = vec![game("30", d2), game("20", d1), game("10", d2), game("5", None)];
        let sorted = sort_games(games);
        let ids: Vec<_> = sorted.iter().map(|g| g.event_id.0.as_str()).collect();
        assert_eq!(ids, vec!["20", "10", "30"]);
    }

    #[test]
    fn test_sort_without_dates_uses_ids() {
        let games = vec![game("100", None), game("9", None), game("25", None)];
        let sorted = sort_games(games);
        let ids: Vec<_> = sorted.iter().map(|g| g.event_id.0.as_str()).collect();
        assert_eq!(ids, vec!["9", "25", "100"]);
    }

    #[test]
    fn test_sort_drops_duplicate_events() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1);
        let games = vec![game("1", d1), game("1", d1), game("2", d1)];
        assert_eq!(sort_games(games).len(), 2);
    }

    #[test]
    fn test_sort_mixed_numeric_and_text_ids() {
        let games: Vec<Game> = (0..200)
            .map(|i| match i % 4 {
                0 => game(&i.to_string(), None),
                1 => game(&format!("{}a", i), None),
                2 => game(&format!("ev-{}", 199 - i), None),
                _ => game(&(1000 - i).to_string(), None),
            })
            .collect();
        let sorted = sort_games(games);
        assert_eq!(sorted.len(), 200);

        let numeric: Vec<u64> = sorted
            .iter()
            .map_while(|g| g.event_id.0.parse().ok())
            .collect();
        assert_eq!(numeric.len(), 100);
        assert!(numeric.windows(2).all(|w| w[0] < w[1]));
        assert!(sorted[100..].iter().all(|g| g.event_id.0.parse::<u64>().is_err()));
        assert!(sorted[100..].windows(2).all(|w| w[0].event_id.0 < w[1].event_id.0));
    }

    #[test]
    fn test_huge_score_total_widens() {
        let event = raw(json!({
            "id": "1",
            "ss": "4294967295-1",
            "time": "1700000000",
            "home": {"id": "1", "name": "A"},
            "away": {"id": "2", "name": "B"}
        }));
        let g = normalize_event(&event).unwrap();
        assert_eq!((g.home_pts, g.away_pts), (u32::MAX, 1));
        assert_eq!(g.total_points(), 4_294_967_296);

        let mut next = g.clone();
        next.event_id = EventId("2".to_string());
        let rows = crate::features::build_rolling_features(
            &[g, next],
            crate::features::RollingConfig::new(10, 1),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].y_total, Some(4_294_967_296));
        assert!((rows[0].home_tot_roll - 4_294_967_296.0).abs() < 1e-3);
    }
}
