//! Recency list of searched cities.
//!
//! The list is most-recent-first, holds no duplicates and never exceeds
//! [`MAX_HISTORY`] entries. It is persisted as a JSON array of strings under
//! [`HISTORY_KEY`].

use anyhow::{Context, Result};

use crate::{model::CityName, store::KeyValueStore};

pub const HISTORY_KEY: &str = "searchHistory";
pub const MAX_HISTORY: usize = 5;

pub type SearchHistory = Vec<CityName>;

#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the persisted list. Missing, unreadable or foreign data yields an
    /// empty history; only the log records that something was wrong.
    pub fn load(&self) -> SearchHistory {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read search history");
                return Vec::new();
            }
        };

        match parse_history(&raw) {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unparseable search history");
                Vec::new()
            }
        }
    }

    /// Move `city` to the front, dropping the oldest entry past the bound.
    pub fn record(history: &[CityName], city: &CityName) -> SearchHistory {
        std::iter::once(city.clone())
            .chain(history.iter().filter(|item| *item != city).cloned())
            .take(MAX_HISTORY)
            .collect()
    }

    pub fn persist(&mut self, history: &[CityName]) -> Result<()> {
        let json = serde_json::to_string(history).context("Failed to serialize search history")?;
        self.store.set(HISTORY_KEY, &json)?;
        tracing::info!(entries = history.len(), "search history saved");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn parse_history(raw: &str) -> Result<SearchHistory> {
    let items: Vec<String> =
        serde_json::from_str(raw).context("search history is not a JSON array of strings")?;

    // Enforce the invariants on whatever another writer left behind.
    let mut history: SearchHistory = Vec::with_capacity(MAX_HISTORY);
    for item in items {
        let Ok(city) = CityName::new(item) else { continue };
        if !history.contains(&city) {
            history.push(city);
        }
        if history.len() == MAX_HISTORY {
            break;
        }
    }
    Ok(history)
}
