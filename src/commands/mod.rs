//! CLI command implementations.

pub mod convert;
pub mod packages;
pub mod rates;
pub mod rpc;
pub mod sheet;

pub use convert::ConvertCommand;
pub use packages::PackagesCommand;
pub use rates::RatesCommand;
pub use rpc::RpcCommand;
pub use sheet::SheetCommand;

use crate::config::Config;
use crate::fx::{LoadedRates, RateCache, RateOrigin};
use chrono::NaiveDate;

/// Command result: text for stdout plus notes for stderr.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    pub text: String,
    pub notes: Vec<String>,
}

impl Output {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), notes: Vec::new() }
    }
}

/// Opens the rate cache the configuration asks for.
pub fn open_cache(config: &Config) -> RateCache {
    if config.no_cache {
        return RateCache::in_memory();
    }
    match config.cache_path() {
        Some(path) => RateCache::open(path),
        None => RateCache::in_memory(),
    }
}

/// Local calendar date, the unit of cache freshness.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Describes a degraded rate load, if it was one.
pub fn rate_note(loaded: &LoadedRates) -> Option<String> {
    let error = loaded.error.as_ref()?;
    Some(match (loaded.origin, loaded.fetched_on) {
        (RateOrigin::Stale, Some(day)) => {
            format!("Could not refresh exchange rates ({}); using rates from {}", error, day)
        }
        _ => format!("Could not load exchange rates ({}); prices show as N/A", error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::RateSourceError;
    use crate::pricing::RateTable;
    use std::path::PathBuf;

    #[test]
    fn test_open_cache_no_cache() {
        let config = Config { no_cache: true, cache_dir: Some(PathBuf::from("/tmp/x")), ..Config::default() };
        assert!(open_cache(&config).path().is_none());
    }

    #[test]
    fn test_open_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { cache_dir: Some(dir.path().to_path_buf()), ..Config::default() };
        assert_eq!(open_cache(&config).path(), Some(dir.path().join("rates.json").as_path()));
    }

    #[test]
    fn test_rate_note() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut loaded = LoadedRates {
            table: RateTable::empty("SGD"),
            origin: RateOrigin::Fetched,
            fetched_on: Some(day),
            error: None,
        };
        assert!(rate_note(&loaded).is_none());

        loaded.origin = RateOrigin::Stale;
        loaded.error = Some(RateSourceError::Status(500));
        assert!(rate_note(&loaded).unwrap().contains("using rates from 2024-03-01"));

        loaded.origin = RateOrigin::Empty;
        loaded.fetched_on = None;
        assert!(rate_note(&loaded).unwrap().contains("prices show as N/A"));
    }
}
