//! Conversion of a whole pricing table into the base currency.

use super::currency;
use super::models::{ConversionReport, ConvertedRow, PriceRow};
use super::parser::parse_raw;
use super::rates::{convert, RateTable};
use super::ranking::{rank_cheapest, DEFAULT_TOP_N};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Converts every row and ranks the cheapest five.
pub fn convert_all(rows: &[PriceRow], rates: &RateTable) -> ConversionReport {
    convert_all_top(rows, rates, DEFAULT_TOP_N)
}

/// Converts every row and ranks the cheapest `top_n`.
///
/// Rows without a currency (or with a blank one) get it from the country
/// lookup. Failures stay on their own row as "N/A".
pub fn convert_all_top(rows: &[PriceRow], rates: &RateTable, top_n: usize) -> ConversionReport {
    let converted: Vec<ConvertedRow> = rows.iter().map(|row| convert_row(row, rates)).collect();
    let cheapest = rank_cheapest(&converted, top_n);

    debug!(
        "Converted {} rows into {} ({} ranked)",
        converted.len(),
        rates.base,
        cheapest.len()
    );

    ConversionReport { base: rates.base.clone(), converted, cheapest }
}

/// Returns the sorted, distinct currency codes the rows need rates for.
pub fn required_codes(rows: &[PriceRow]) -> Vec<String> {
    rows.iter()
        .filter_map(row_currency)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn row_currency(row: &PriceRow) -> Option<String> {
    match row.currency.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Some(code.to_string()),
        _ => currency::resolve(&row.country).map(String::from),
    }
}

/// Converts a single row.
pub fn convert_row(row: &PriceRow, rates: &RateTable) -> ConvertedRow {
    let currency = row_currency(row);

    let amount = parse_raw(&row.raw_price);
    let result = convert(amount, currency.as_deref(), rates);

    if let Err(e) = &result {
        trace!("{}: {}", row.country, e);
    }

    ConvertedRow {
        country: row.country.clone(),
        raw_price: row.raw_price.clone(),
        currency,
        amount: result,
    }
}
