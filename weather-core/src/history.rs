use anyhow::{Context, Result};
use tracing::warn;

use crate::storage::KeyValueStore;

/// Storage key holding the JSON-encoded list.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most-recent-first list of searched cities, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentSearchHistory {
    entries: Vec<String>,
}

impl RecentSearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary list, keeping the same rules as `push`.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new();
        let collected: Vec<String> = entries.into_iter().map(Into::into).collect();
        for city in collected.into_iter().rev() {
            history.push(city);
        }
        history
    }

    /// Move `city` to the front. Matching is exact and case-sensitive.
    pub fn push(&mut self, city: impl Into<String>) {
        let city = city.into();
        self.entries.retain(|existing| *existing != city);
        self.entries.insert(0, city);
        self.entries.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Absent key yields an empty history.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let Some(raw) = store
            .get(RECENT_SEARCHES_KEY)
            .context("Failed to read recent searches")?
        else {
            return Ok(Self::new());
        };

        let entries: Vec<String> =
            serde_json::from_str(&raw).context("Failed to parse recent searches")?;

        Ok(Self::from_entries(entries))
    }

    /// Like [`load`](Self::load), but unreadable state is logged and treated as empty.
    pub fn load_or_empty(store: &dyn KeyValueStore) -> Self {
        Self::load(store).unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring stored recent searches");
            Self::new()
        })
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let raw =
            serde_json::to_string(&self.entries).context("Failed to serialize recent searches")?;
        store
            .set(RECENT_SEARCHES_KEY, &raw)
            .context("Failed to persist recent searches")
    }
}
