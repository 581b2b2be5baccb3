//! Feature extraction
//!
//! Converts chronologically ordered games into leak-free model rows.

pub mod rolling;
pub mod schema;

pub use rolling::{build_rolling_features, RollingConfig, RollingFeatureEngine, TeamHistory};
pub use schema::{FeatureRow, FeatureVector, RollingStats, Side, FEATURE_COLUMNS, TABLE_COLUMNS};
