//! Day-keyed rate cache stored as a JSON file.

use crate::pricing::RateTable;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A rate table and the day it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    pub fetched_on: NaiveDate,
    pub rates: RateTable,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    entries: BTreeMap<String, CachedRates>,
}

/// Rate tables keyed by base currency.
#[derive(Debug, Default)]
pub struct RateCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CachedRates>,
}

impl RateCache {
    /// Opens the cache at `path`. A missing or unreadable file gives an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CacheFile>(&content) {
                Ok(file) => {
                    debug!("Loaded {} cached rate tables from {}", file.entries.len(), path.display());
                    file.entries
                }
                Err(e) => {
                    warn!("Ignoring corrupt rate cache {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                debug!("No rate cache at {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path: Some(path), entries }
    }

    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Returns the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the entry for a base currency, however old.
    pub fn get(&self, base: &str) -> Option<&CachedRates> {
        self.entries.get(&normalize(base))
    }

    /// True when the entry for `base` was fetched on `today`.
    pub fn is_fresh(&self, base: &str, today: NaiveDate) -> bool {
        self.get(base).is_some_and(|entry| entry.fetched_on == today)
    }

    /// Stores a table fetched on `today`, replacing any previous entry for its base.
    pub fn put(&mut self, rates: RateTable, today: NaiveDate) {
        let key = normalize(&rates.base);
        debug!("Caching {} rates for {} ({})", rates.len(), key, today);
        self.entries.insert(key, CachedRates { fetched_on: today, rates });
    }

    /// Writes the cache to its file. In-memory caches are left alone.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }

        let file = CacheFile { entries: self.entries.clone() };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize rate cache")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write rate cache: {}", path.display()))
    }
}

fn normalize(base: &str) -> String {
    base.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn table() -> RateTable {
        RateTable::new("SGD", [("JPY", 110.5), ("USD", 0.74)])
    }

    #[test]
    fn test_freshness_is_same_day() {
        let mut cache = RateCache::in_memory();
        assert!(!cache.is_fresh("SGD", day(1)));

        cache.put(table(), day(1));
        assert!(cache.is_fresh("SGD", day(1)));
        assert!(cache.is_fresh("sgd", day(1)));
        assert!(!cache.is_fresh("SGD", day(2)));
        assert!(!cache.is_fresh("USD", day(1)));
    }

    #[test]
    fn test_stale_entry_still_readable() {
        let mut cache = RateCache::in_memory();
        cache.put(table(), day(1));

        let entry = cache.get("SGD").unwrap();
        assert_eq!(entry.fetched_on, day(1));
        assert_eq!(entry.rates.rate("JPY"), Some(110.5));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("rates.json");

        let mut cache = RateCache::open(&path);
        assert!(cache.get("SGD").is_none());
        cache.put(table(), day(5));
        cache.save().unwrap();

        let reopened = RateCache::open(&path);
        assert!(reopened.is_fresh("SGD", day(5)));
        assert_eq!(reopened.get("SGD").unwrap().rates, table());
    }

    #[test]
    fn test_corrupt_file_gives_empty_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rates.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = RateCache::open(&path);
        assert!(cache.get("SGD").is_none());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut cache = RateCache::in_memory();
        cache.put(table(), day(1));
        assert!(cache.save().is_ok());
        assert!(cache.path().is_none());
    }

    #[test]
    fn test_put_replaces_entry() {
        let mut cache = RateCache::in_memory();
        cache.put(table(), day(1));
        cache.put(RateTable::new("SGD", [("EUR", 0.68)]), day(2));

        let entry = cache.get("SGD").unwrap();
        assert_eq!(entry.fetched_on, day(2));
        assert_eq!(entry.rates.rate("JPY"), None);
    }
}
