//! Exchange rate tables and conversion into the base currency.

use super::models::ConversionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Rates expressed as "units of currency X per 1 unit of the base currency".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRates")]
pub struct RateTable {
    /// Base currency code
    pub base: String,
    /// Currency code to rate; only finite, positive rates are kept
    rates: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct StoredRates {
    base: String,
    rates: BTreeMap<String, f64>,
}

impl From<StoredRates> for RateTable {
    fn from(stored: StoredRates) -> Self {
        RateTable::new(stored.base, stored.rates)
    }
}

impl RateTable {
    /// Creates a table, dropping zero, negative and non-finite rates.
    pub fn new<I, K>(base: impl Into<String>, rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let base = base.into();
        let mut kept = BTreeMap::new();

        for (code, rate) in rates {
            let code = code.into();
            if rate.is_finite() && rate > 0.0 {
                kept.insert(code, rate);
            } else {
                debug!("Dropping unusable rate {} for {}", rate, code);
            }
        }

        Self { base, rates: kept }
    }

    /// Creates a table with no rates; every conversion against it fails.
    pub fn empty(base: impl Into<String>) -> Self {
        Self { base: base.into(), rates: BTreeMap::new() }
    }

    /// Returns the rate for a currency code.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Returns the number of rates.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if there are no rates.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterates over rates in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns this table overlaid with `newer`; rates in `newer` win.
    pub fn merged(&self, newer: &RateTable) -> RateTable {
        let mut rates = self.rates.clone();
        rates.extend(newer.rates.iter().map(|(k, v)| (k.clone(), *v)));
        Self { base: newer.base.clone(), rates }
    }
}

/// Rounds half-up to two decimals on the scaled value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Converts an amount in `from` into the table's base currency.
pub fn convert(
    amount: Option<f64>,
    from: Option<&str>,
    rates: &RateTable,
) -> Result<f64, ConversionError> {
    let code = from.ok_or(ConversionError::UnknownCurrency)?;
    let amount = amount.ok_or(ConversionError::UnparseablePrice)?;
    let rate = rates.rate(code).ok_or_else(|| ConversionError::MissingRate(code.to_string()))?;

    Ok(round2(amount / rate))
}
