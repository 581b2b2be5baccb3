//! Data ingestion and storage
//!
//! Events API client, record normalization and CSV tables.

pub mod api;
pub mod normalize;
pub mod score;
pub mod table;

pub use api::EventsClient;
pub use normalize::{normalize_event, normalize_events, sort_games, RawEvent};
pub use score::parse_score;
