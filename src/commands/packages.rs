//! Packages command: list the price columns of a pricing page.

use super::Output;
use crate::config::Config;
use crate::format::Formatter;
use crate::scrape::{PageClient, PageFetch, PricingTable};
use anyhow::{Context, Result};

/// Lists the package columns of a pricing table.
pub struct PackagesCommand {
    config: Config,
}

impl PackagesCommand {
    /// Creates a new packages command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches the page and lists its packages.
    pub async fn execute(&self, url: &str) -> Result<Output> {
        let client = PageClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, url).await
    }

    /// Lists packages with a provided client (for testing).
    pub async fn execute_with_client<F: PageFetch + ?Sized>(&self, client: &F, url: &str) -> Result<Output> {
        let html = client.fetch(url).await?;
        let table = PricingTable::parse(&html)?;

        let formatter = Formatter::new(self.config.format);
        Ok(Output::new(formatter.format_list("Packages", &table.packages())))
    }
}
