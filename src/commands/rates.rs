//! Rates command: show the exchange rates the other commands would use.

use super::{open_cache, rate_note, today, Output};
use crate::config::Config;
use crate::format::Formatter;
use crate::fx::{self, load_rates, RateCache, RateSource};
use crate::pricing::currency;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Loads and prints the rate table for the base currency.
pub struct RatesCommand {
    config: Config,
}

impl RatesCommand {
    /// Creates a new rates command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads rates from the cache or the configured source.
    pub async fn execute(&self) -> Result<Output> {
        let source = fx::rate_source(&self.config).context("Failed to create rate source")?;
        let mut cache = open_cache(&self.config);
        self.execute_with(source.as_ref(), &mut cache, today()).await
    }

    /// Loads rates with a provided source and cache (for testing).
    pub async fn execute_with<S: RateSource + ?Sized>(
        &self,
        source: &S,
        cache: &mut RateCache,
        today: NaiveDate,
    ) -> Result<Output> {
        let base = fx::normalize_base(&self.config.base_currency)?;
        let symbols: Vec<String> = currency::currencies().into_iter().map(String::from).collect();

        let loaded = load_rates(source, cache, &base, &symbols, today).await;
        info!("{} rates for {} ({})", loaded.table.len(), base, loaded.origin);

        let formatter = Formatter::new(self.config.format);
        let mut output = Output::new(formatter.format_rates(&loaded.table));
        output.notes.extend(rate_note(&loaded));
        Ok(output)
    }
}
