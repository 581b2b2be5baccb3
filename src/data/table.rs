//! Flat CSV tables for games and feature rows

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::features::schema::{FeatureRow, TABLE_COLUMNS};
use crate::{Game, HoopsError, Result};

/// Column order of `games.csv`
pub const GAME_COLUMNS: [&str; 8] = [
    "event_id", "date", "home_id", "away_id", "home_name", "away_name", "home_pts", "away_pts",
];

fn write_table<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every row that deserializes cleanly; malformed rows are skipped
fn read_table<T: DeserializeOwned>(path: &Path, header: &[&str]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = header
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(HoopsError::Schema(format!(
            "{} is missing columns: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                log::debug!("Skipping row in {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {} malformed rows in {}", skipped, path.display());
    }
    Ok(rows)
}

pub fn write_games(path: &Path, games: &[Game]) -> Result<()> {
    write_table(path, &GAME_COLUMNS, games)
}

pub fn read_games(path: &Path) -> Result<Vec<Game>> {
    read_table(path, &GAME_COLUMNS)
}

pub fn write_features(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    write_table(path, &TABLE_COLUMNS, rows)
}

pub fn read_features(path: &Path) -> Result<Vec<FeatureRow>> {
    read_table(path, &TABLE_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rolling::{build_rolling_features, RollingConfig};
    use crate::testing::make_game as game;

    #[test]
    fn test_games_table_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("games.csv");
        let mut games = vec![game(1, "1", "2", 101, 97), game(2, "2", "1", 88, 90)];
        games[1].date = None;

        write_games(&path, &games).unwrap();
        let read = read_games(&path).unwrap();
        assert_eq!(read, games);
    }

    #[test]
    fn test_feature_table_header_matches_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        write_features(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), TABLE_COLUMNS.join(","));
        assert!(read_features(&path).unwrap().is_empty());
    }

    #[test]
    fn test_feature_table_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let games: Vec<Game> = (1..=6)
            .map(|i| {
                if i % 2 == 0 {
                    game(i, "1", "2", 100 + i, 90)
                } else {
                    game(i, "2", "1", 95, 105 - i)
                }
            })
            .collect();
        let rows = build_rolling_features(&games, RollingConfig::new(3, 2));
        assert!(!rows.is_empty());

        write_features(&path, &rows).unwrap();
        let read = read_features(&path).unwrap();
        assert_eq!(read.len(), rows.len());
        for (a, b) in read.iter().zip(rows.iter()) {
            assert_eq!(a.home_name, b.home_name);
            assert_eq!(a.y_total, b.y_total);
            assert!((a.exp_total_mix - b.exp_total_mix).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        std::fs::write(&path, "date,home_name\n2024-01-01,A\n").unwrap();
        assert!(matches!(read_features(&path), Err(HoopsError::Schema(_))));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.csv");
        std::fs::write(
            &path,
            "event_id,date,home_id,away_id,home_name,away_name,home_pts,away_pts\n\
             1,2024-01-01,1,2,A,B,100,90\n\
             2,2024-01-02,1,2,A,B,,90\n",
        )
        .unwrap();
        let games = read_games(&path).unwrap();
        assert_eq!(games.len(), 1);
    }
}
