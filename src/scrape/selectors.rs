//! CSS selectors for pricing table extraction.
//!
//! The pricing page is a plain HTML table: the first row holds the column
//! headers (country, then one column per package) and every following row
//! holds a country and its prices.

use scraper::Selector;
use std::sync::LazyLock;

/// The pricing table. Only the first match is used.
pub static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());

/// Table rows, header included.
pub static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

/// Header cells.
pub static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

/// Data cells.
pub static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_parse() {
        let html = Html::parse_document(
            "<table><tr><th>Country</th></tr><tr><td>Japan</td></tr></table>",
        );
        assert!(html.select(&TABLE).next().is_some());
        assert_eq!(html.select(&ROW).count(), 2);
        assert_eq!(html.select(&HEADER_CELL).count(), 1);
        assert_eq!(html.select(&DATA_CELL).count(), 1);
    }
}
