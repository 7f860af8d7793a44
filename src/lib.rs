//! fxtable - Convert country pricing tables into one currency
//!
//! Scrapes a pricing table (or reads a spreadsheet export), maps each
//! country to its currency, fetches exchange rates, and ranks the cheapest
//! countries in the base currency.

pub mod commands;
pub mod config;
pub mod format;
pub mod fx;
pub mod pricing;
pub mod protocol;
pub mod scrape;
pub mod sheet;

pub use config::{Config, OutputFormat, Provider};
pub use pricing::{ConversionReport, ConvertedRow, PriceRow, RankedEntry, RateTable, RawPrice};
pub use scrape::{ColumnChoice, PricingTable};
