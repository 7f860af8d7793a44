//! Data models for price rows, conversion results, and rankings.

use serde::{Deserialize, Serialize, Serializer};

/// Marker rendered wherever a row could not be converted.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw price cell as captured from a page or sheet.
///
/// Only text is ever parsed. Numbers and empty cells count as
/// "not text" and never produce an amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// Price text such as `"$12.99"` or `"1.234,56 €"`
    Text(String),
    /// A bare number (typed spreadsheet cell or JSON number)
    Number(f64),
    /// Cell absent from the row
    Missing,
}

impl RawPrice {
    /// Returns the text if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawPrice::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl std::fmt::Display for RawPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawPrice::Text(text) => write!(f, "{}", text),
            RawPrice::Number(n) => write!(f, "{}", n),
            RawPrice::Missing => Ok(()),
        }
    }
}

impl From<&str> for RawPrice {
    fn from(text: &str) -> Self {
        RawPrice::Text(text.to_string())
    }
}

impl From<String> for RawPrice {
    fn from(text: String) -> Self {
        RawPrice::Text(text)
    }
}

/// One scraped or read record pairing a country with its raw price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    /// Country name exactly as shown in the source table
    pub country: String,
    /// Price cell
    #[serde(default = "missing_price")]
    pub raw_price: RawPrice,
    /// Currency code when the source already carries one
    #[serde(default)]
    pub currency: Option<String>,
}

fn missing_price() -> RawPrice {
    RawPrice::Missing
}

impl PriceRow {
    /// Creates a row without a currency; the pipeline resolves it from the country.
    pub fn new(country: impl Into<String>, raw_price: impl Into<RawPrice>) -> Self {
        Self { country: country.into(), raw_price: raw_price.into(), currency: None }
    }

    /// Creates a row with an attached currency code.
    pub fn with_currency(
        country: impl Into<String>,
        raw_price: impl Into<RawPrice>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            raw_price: raw_price.into(),
            currency: Some(currency.into()),
        }
    }
}

/// Why a row ended up as "N/A".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("price could not be parsed")]
    UnparseablePrice,
    #[error("country has no known currency")]
    UnknownCurrency,
    #[error("no exchange rate for {0}")]
    MissingRate(String),
}

/// A row after conversion into the base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedRow {
    /// Country name
    pub country: String,
    /// Original price cell
    pub raw_price: RawPrice,
    /// Currency the price was read in (None when the country is unknown)
    pub currency: Option<String>,
    /// Amount in the base currency, rounded to 2 decimals
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Result<f64, ConversionError>,
}

impl ConvertedRow {
    /// Returns the converted amount if available.
    pub fn value(&self) -> Option<f64> {
        self.amount.as_ref().ok().copied()
    }

    /// Returns the amount with two decimals, or "N/A".
    pub fn amount_text(&self) -> String {
        match self.amount {
            Ok(v) => format!("{:.2}", v),
            Err(_) => NOT_AVAILABLE.to_string(),
        }
    }
}

fn serialize_amount<S: Serializer>(
    amount: &Result<f64, ConversionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match amount {
        Ok(v) => serializer.serialize_f64(*v),
        Err(_) => serializer.serialize_str(NOT_AVAILABLE),
    }
}

/// A successfully converted row selected by the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Country name
    pub country: String,
    /// Converted amount
    pub amount: f64,
}

impl RankedEntry {
    /// Renders as `"<country>: <currency> <amount>"`.
    pub fn display(&self, currency: &str) -> String {
        format!("{}: {} {:.2}", self.country, currency, self.amount)
    }
}

/// Output of a full conversion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Base currency every amount is expressed in
    pub base: String,
    /// Every input row, in input order
    pub converted: Vec<ConvertedRow>,
    /// Cheapest successfully converted rows, ascending
    pub cheapest: Vec<RankedEntry>,
}

impl ConversionReport {
    /// Number of rows that converted successfully.
    pub fn converted_count(&self) -> usize {
        self.converted.iter().filter(|r| r.amount.is_ok()).count()
    }

    /// Number of rows that ended up as "N/A".
    pub fn failed_count(&self) -> usize {
        self.converted.len() - self.converted_count()
    }
}
