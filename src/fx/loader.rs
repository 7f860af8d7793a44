//! Cache-first rate loading with fallback.

use super::cache::RateCache;
use super::source::RateSource;
use super::RateSourceError;
use crate::pricing::RateTable;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where a loaded rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    /// Cached today
    Cache,
    /// Fetched just now
    Fetched,
    /// Fetch failed or returned nothing; an older cached table is used
    Stale,
    /// Fetch failed and nothing was cached
    Empty,
}

impl std::fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateOrigin::Cache => write!(f, "cache"),
            RateOrigin::Fetched => write!(f, "fetched"),
            RateOrigin::Stale => write!(f, "stale cache"),
            RateOrigin::Empty => write!(f, "none"),
        }
    }
}

/// Result of a rate load. The table is always usable; `error` carries the
/// fetch failure when there was one.
#[derive(Debug, Clone)]
pub struct LoadedRates {
    pub table: RateTable,
    pub origin: RateOrigin,
    pub fetched_on: Option<NaiveDate>,
    pub error: Option<RateSourceError>,
}

/// Loads rates for `base`: today's cached table if it covers what is needed,
/// else a fresh fetch (stored back into the cache), else the last known
/// table or an empty one.
pub async fn load_rates<S>(
    source: &S,
    cache: &mut RateCache,
    base: &str,
    symbols: &[String],
    today: NaiveDate,
) -> LoadedRates
where
    S: RateSource + ?Sized,
{
    let base = base.trim().to_uppercase();

    if cache.is_fresh(&base, today) {
        if let Some(entry) = cache.get(&base) {
            let covered = !source.needs_symbols()
                || symbols.iter().all(|code| entry.rates.rate(code).is_some() || *code == base);
            if covered {
                debug!("Using cached {} rates from {}", base, entry.fetched_on);
                return LoadedRates {
                    table: entry.rates.clone(),
                    origin: RateOrigin::Cache,
                    fetched_on: Some(entry.fetched_on),
                    error: None,
                };
            }
            debug!("Cached {} rates miss requested symbols, refetching", base);
        }
    }

    match source.fetch(&base, symbols).await {
        Ok(table) if table.is_empty() => {
            // An empty symbol list asks for nothing
            let error = (!source.needs_symbols() || !symbols.is_empty())
                .then(|| RateSourceError::Api("no rates returned".to_string()));
            debug!("{} returned no {} rates, keeping the cached table", source.name(), base);
            fallback(cache, base, today, error)
        }
        Ok(table) => {
            info!("Fetched {} rates for {} from {}", table.len(), base, source.name());
            let table = match cache.get(&base) {
                Some(entry) if source.needs_symbols() => entry.rates.merged(&table),
                _ => table,
            };
            cache.put(table.clone(), today);
            if let Err(e) = cache.save() {
                warn!("Failed to save rate cache: {:#}", e);
            }
            LoadedRates { table, origin: RateOrigin::Fetched, fetched_on: Some(today), error: None }
        }
        Err(error) => {
            warn!("Rate fetch from {} failed: {}", source.name(), error);
            fallback(cache, base, today, Some(error))
        }
    }
}

/// The cached table for `base` however old, or an empty one.
fn fallback(
    cache: &RateCache,
    base: String,
    today: NaiveDate,
    error: Option<RateSourceError>,
) -> LoadedRates {
    match cache.get(&base) {
        Some(entry) => LoadedRates {
            table: entry.rates.clone(),
            origin: if error.is_none() && entry.fetched_on == today {
                RateOrigin::Cache
            } else {
                RateOrigin::Stale
            },
            fetched_on: Some(entry.fetched_on),
            error,
        },
        None => LoadedRates { table: RateTable::empty(base), origin: RateOrigin::Empty, fetched_on: None, error },
    }
}
