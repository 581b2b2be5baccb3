//! Events API client for ended basketball games
//!
//! Fetches pages of the BetsAPI ended-events endpoint one at a time. Every
//! fetched page is cached as raw JSON so reruns over the same page set make
//! no network requests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::normalize::{EventsPage, RawEvent};
use crate::{ApiConfig, HoopsError, Result};

/// Blocking client for the ended-events endpoint
pub struct EventsClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
    sport_id: u32,
    league_id: u32,
    /// Directory holding `ended_page_<n>.json` files
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl EventsClient {
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("hoops/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(EventsClient {
            client,
            base_url: format!("{}/", config.base_url.trim_end_matches('/')),
            token,
            sport_id: config.sport_id,
            league_id: config.league_id,
            cache_dir: None,
            offline_only: false,
        })
    }

    /// Cache fetched pages in the given directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}v3/events/ended", self.base_url)
    }

    fn cache_path(&self, page: u32) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("ended_page_{}.json", page)))
    }

    fn load_from_cache(&self, page: u32) -> Option<String> {
        let path = self.cache_path(page)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    fn save_to_cache(&self, page: u32, body: &str) -> Result<()> {
        if let Some(path) = self.cache_path(page) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, body)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }

    fn fetch_remote(&self, page: u32) -> Result<String> {
        let token = self.token.as_deref().ok_or_else(|| {
            HoopsError::Config("Missing BETS_API_TOKEN. Set it in the environment or config.".to_string())
        })?;

        log::info!("Fetching ended events page {}", page);
        let body = self
            .client
            .get(self.endpoint())
            .query(&[
                ("token", token.to_string()),
                ("sport_id", self.sport_id.to_string()),
                ("league_id", self.league_id.to_string()),
                ("page", page.to_string()),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }

    /// Fetch one page of ended events, from cache when available
    pub fn ended_events(&self, page: u32) -> Result<EventsPage> {
        let body = match self.load_from_cache(page) {
            Some(cached) => cached,
            None if self.offline_only => {
                return Err(HoopsError::Api {
                    page,
                    message: "no cached data (offline mode)".to_string(),
                })
            }
            None => {
                let body = self.fetch_remote(page)?;
                let parsed: EventsPage = serde_json::from_str(&body)?;
                if let Some(message) = parsed.failure() {
                    return Err(HoopsError::Api { page, message });
                }
                if let Err(e) = self.save_to_cache(page, &body) {
                    log::warn!("Failed to cache page {}: {}", page, e);
                }
                return Ok(parsed);
            }
        };

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch pages `1..=pages` and collect every raw event
    pub fn fetch_all(&self, pages: u32) -> Result<Vec<RawEvent>> {
        let mut events = Vec::new();
        for page in 1..=pages {
            let results = self.ended_events(page)?.into_results();
            log::debug!("Page {}: {} events", page, results.len());
            events.extend(results);
        }
        Ok(events)
    }
}
