//! Spreadsheet conversion: fill in currency codes and converted prices on a
//! country/price grid.

pub mod grid;

pub use grid::{Separator, Sheet};

use crate::pricing::{currency, ConversionReport, PriceRow, RawPrice};
use anyhow::{Context, Result};
use tracing::debug;

/// Header of the country column.
pub const COUNTRY_HEADER: &str = "Country";

/// Header of the currency code column.
pub const CURRENCY_HEADER: &str = "Currency Code";

/// Header of the converted price column for a base currency.
pub fn converted_header(base: &str) -> String {
    format!("Converted Price in {}", base)
}

fn country_column(sheet: &Sheet) -> Result<usize> {
    sheet
        .column(COUNTRY_HEADER)
        .with_context(|| format!("Sheet has no '{}' column", COUNTRY_HEADER))
}

/// Writes each row's currency code, appending the column when missing.
/// Unknown countries get a blank cell. Returns how many rows were resolved.
pub fn map_currency_codes(sheet: &mut Sheet) -> Result<usize> {
    let country_col = country_column(sheet)?;
    let code_col = sheet.ensure_column(CURRENCY_HEADER);

    let mut resolved = 0;
    for row in 0..sheet.rows.len() {
        let code = currency::resolve(sheet.cell(row, country_col).trim()).unwrap_or("");
        if !code.is_empty() {
            resolved += 1;
        }
        sheet.set_cell(row, code_col, code);
    }

    debug!("Mapped currency codes for {}/{} rows", resolved, sheet.rows.len());
    Ok(resolved)
}

/// Reads one price row per sheet row, in order.
///
/// A non-blank "Currency Code" cell is carried along; otherwise the country
/// lookup decides during conversion.
pub fn price_rows(sheet: &Sheet, price_header: &str) -> Result<Vec<PriceRow>> {
    let country_col = country_column(sheet)?;
    let price_col = sheet
        .column(price_header)
        .with_context(|| format!("Sheet has no '{}' column", price_header))?;
    let code_col = sheet.column(CURRENCY_HEADER);

    Ok((0..sheet.rows.len())
        .map(|row| {
            let price = sheet.cell(row, price_col);
            PriceRow {
                country: sheet.cell(row, country_col).trim().to_string(),
                raw_price: if price.trim().is_empty() {
                    RawPrice::Missing
                } else {
                    RawPrice::Text(price.to_string())
                },
                currency: code_col
                    .map(|c| sheet.cell(row, c).trim())
                    .filter(|c| !c.is_empty())
                    .map(String::from),
            }
        })
        .collect())
}

/// Writes converted amounts (or "N/A") into the base currency column,
/// appending it when missing. `report` must come from [`price_rows`] on the
/// same sheet.
pub fn write_converted(sheet: &mut Sheet, report: &ConversionReport) {
    let col = sheet.ensure_column(&converted_header(&report.base));

    for (row, converted) in report.converted.iter().enumerate() {
        sheet.set_cell(row, col, converted.amount_text());
    }
}
