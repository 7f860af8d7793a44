//! Cheapest-N selection over converted rows.

use super::models::{ConvertedRow, RankedEntry};

/// How many entries the cheapest summary shows by default.
pub const DEFAULT_TOP_N: usize = 5;

/// Returns the `n` cheapest converted rows, ascending.
///
/// Rows that failed to convert are skipped. Equal amounts keep their input
/// order.
pub fn rank_cheapest(rows: &[ConvertedRow], n: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = rows
        .iter()
        .filter_map(|row| {
            row.value().map(|amount| RankedEntry { country: row.country.clone(), amount })
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| a.amount.total_cmp(&b.amount));
    entries.truncate(n);
    entries
}
