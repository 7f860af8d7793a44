//! Convert command: scrape a pricing page and convert it into the base currency.

use super::{open_cache, rate_note, today, Output};
use crate::config::Config;
use crate::format::Formatter;
use crate::fx::{self, load_rates, RateCache, RateSource};
use crate::pricing;
use crate::scrape::{ColumnChoice, PageClient, PageFetch, PricingTable};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Scrapes a pricing table and converts the chosen package column.
pub struct ConvertCommand {
    config: Config,
}

impl ConvertCommand {
    /// Creates a new convert command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches the page, loads rates and returns the formatted report.
    pub async fn execute(&self, url: &str) -> Result<Output> {
        let client = PageClient::new(&self.config).context("Failed to create HTTP client")?;
        let source = fx::rate_source(&self.config).context("Failed to create rate source")?;
        let mut cache = open_cache(&self.config);

        self.execute_with(&client, source.as_ref(), &mut cache, url, today()).await
    }

    /// Runs the conversion with provided collaborators (for testing).
    pub async fn execute_with<F, S>(
        &self,
        fetcher: &F,
        source: &S,
        cache: &mut RateCache,
        url: &str,
        today: NaiveDate,
    ) -> Result<Output>
    where
        F: PageFetch + ?Sized,
        S: RateSource + ?Sized,
    {
        let base = fx::normalize_base(&self.config.base_currency)?;

        let html = fetcher.fetch(url).await?;
        let table = PricingTable::parse(&html)?;

        let choice =
            ColumnChoice::from_options(self.config.package.as_deref(), self.config.price_column);
        let rows = table.price_rows(&choice)?;
        info!("Found {} priced countries", rows.len());

        let symbols = pricing::required_codes(&rows);
        let loaded = load_rates(source, cache, &base, &symbols, today).await;

        let report = pricing::convert_all_top(&rows, &loaded.table, self.config.top_n);

        let formatter = Formatter::new(self.config.format);
        let mut output = Output::new(formatter.format_report(&report));
        output.notes.extend(rate_note(&loaded));
        Ok(output)
    }
}
