//! Extraction of the pricing table from a page.

use super::selectors;
use crate::pricing::{PriceRow, RawPrice};
use anyhow::{Context, Result};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Which column holds the price to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnChoice {
    /// Column whose header text equals this package name
    Package(String),
    /// Zero-based column index; 0 is the country column
    Index(usize),
}

impl ColumnChoice {
    /// Picks the package column when a name is given, else the configured index.
    pub fn from_options(package: Option<&str>, index: usize) -> Self {
        match package {
            Some(name) if !name.trim().is_empty() => ColumnChoice::Package(name.trim().to_string()),
            _ => ColumnChoice::Index(index),
        }
    }
}

/// The first table of a pricing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    /// Header texts, first one being the country column
    pub headers: Vec<String>,
    /// Data rows as cell texts
    pub rows: Vec<Vec<String>>,
}

impl PricingTable {
    /// Parses the first `<table>` in the document.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);

        let table = document.select(&selectors::TABLE).next().context("No pricing table found on page")?;

        let mut rows = table.select(&selectors::ROW);

        let headers = match rows.next() {
            Some(row) => header_texts(row),
            None => Vec::new(),
        };

        let mut data = Vec::new();
        for row in rows {
            let cells: Vec<String> = row.select(&selectors::DATA_CELL).map(cell_text).collect();
            if cells.len() < 2 {
                trace!("Skipping row with {} cells", cells.len());
                continue;
            }
            data.push(cells);
        }

        debug!("Parsed pricing table: {} columns, {} rows", headers.len(), data.len());
        Ok(Self { headers, rows: data })
    }

    /// Returns the package names, i.e. every header after the country column.
    pub fn packages(&self) -> Vec<String> {
        self.headers.iter().skip(1).cloned().collect()
    }

    /// Resolves a column choice to an index.
    pub fn column_index(&self, choice: &ColumnChoice) -> Result<usize> {
        match choice {
            ColumnChoice::Package(name) => self
                .headers
                .iter()
                .position(|h| h == name)
                .filter(|i| *i > 0)
                .with_context(|| {
                    format!("Unknown package: {}. Available: {}", name, self.packages().join(", "))
                }),
            ColumnChoice::Index(0) => anyhow::bail!("Column 0 is the country column, not a price"),
            ColumnChoice::Index(i) => {
                if !self.headers.is_empty() && *i >= self.headers.len() {
                    anyhow::bail!(
                        "Column {} out of range; table has {} columns",
                        i,
                        self.headers.len()
                    );
                }
                Ok(*i)
            }
        }
    }

    /// Turns the table into price rows using the chosen column.
    pub fn price_rows(&self, choice: &ColumnChoice) -> Result<Vec<PriceRow>> {
        let index = self.column_index(choice)?;

        Ok(self
            .rows
            .iter()
            .filter_map(|cells| {
                let country = cells.first()?;
                Some(PriceRow {
                    country: country.clone(),
                    raw_price: cells.get(index).cloned().map(RawPrice::Text).unwrap_or(RawPrice::Missing),
                    currency: None,
                })
            })
            .collect())
    }
}

/// Header texts from `th` cells, falling back to `td` for tables without them.
fn header_texts(row: ElementRef) -> Vec<String> {
    let headers: Vec<String> = row.select(&selectors::HEADER_CELL).map(cell_text).collect();
    if !headers.is_empty() {
        return headers;
    }
    row.select(&selectors::DATA_CELL).map(cell_text).collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
