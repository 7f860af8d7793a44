//! Heuristic parsing of localized price strings into amounts.

use super::models::RawPrice;
use std::borrow::Cow;
use tracing::trace;

/// Local currency abbreviations whose prices use a comma decimal separator.
///
/// The abbreviation itself contains a dot, so it has to go before the generic
/// cleaning keeps that dot as a separator.
const COMMA_DECIMAL_PREFIXES: &[&str] = &[
    "S/.", // Peruvian sol
];

/// Parses a raw price cell. Anything that is not text is unparseable.
pub fn parse_raw(raw: &RawPrice) -> Option<f64> {
    raw.as_text().and_then(parse_price)
}

/// Parses a localized price string like `"$12.99"`, `"1.234,56 €"` or `"S/. 45,00"`.
///
/// Returns `None` when no digits remain after cleaning, or when the number
/// read is not a finite, non-negative value. The result is not rounded.
pub fn parse_price(raw: &str) -> Option<f64> {
    let text = strip_local_prefix(raw.trim());

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = normalize_separators(&cleaned);
    let value = leading_number(&normalized)?;
    trace!("Parsed price {:?} -> {}", raw, value);

    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Removes a known comma-decimal currency prefix and makes its comma the decimal point
/// when only digits follow that comma.
fn strip_local_prefix(text: &str) -> Cow<'_, str> {
    for prefix in COMMA_DECIMAL_PREFIXES {
        let Some(rest) = text.strip_prefix(*prefix) else {
            continue;
        };

        let rest = rest.trim();
        return match rest.rsplit_once(',') {
            Some((whole, fraction))
                if !fraction.is_empty() && fraction.bytes().all(|b| b.is_ascii_digit()) =>
            {
                let whole: String = whole.chars().filter(|c| *c != '.' && *c != ',').collect();
                Cow::Owned(format!("{}.{}", whole, fraction))
            }
            // No comma fraction, e.g. "1,234.50": the generic rules apply
            _ => Cow::Borrowed(rest),
        };
    }

    Cow::Borrowed(text)
}

/// Decides which of `,` and `.` is the decimal point, based on how often each occurs.
fn normalize_separators(cleaned: &str) -> String {
    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    match (commas, dots) {
        // 1,234,567 -> grouping commas
        (c, 0) if c >= 2 => cleaned.replace(',', ""),
        // 1,500 -> grouping comma, 45,00 -> decimal comma
        (1, 0) => {
            if has_group_of_three_after(cleaned, ',') {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        // 1.234.567 -> grouping dots
        (0, d) if d >= 2 => cleaned.replace('.', ""),
        // 12.99
        (0, 1) => cleaned.to_string(),
        // 1,234,567.89 and other malformed mixes with many commas
        (c, d) if c >= 2 && d > 0 => cleaned.replace(',', ""),
        // Both present: the separator that comes last is the decimal point
        (c, d) if c > 0 && d > 0 => {
            let last_comma = cleaned.rfind(',');
            let last_dot = cleaned.rfind('.');
            if last_comma > last_dot {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned.replace(',', ""),
    }
}

/// True when exactly three digits follow the only `sep` in the text.
fn has_group_of_three_after(text: &str, sep: char) -> bool {
    let Some((_, tail)) = text.split_once(sep) else {
        return false;
    };
    let digits = tail.chars().take_while(|c| c.is_ascii_digit()).count();
    digits == 3 && tail.len() == 3
}

/// Reads the longest leading decimal literal, ignoring whatever follows it.
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }

    if digits == 0 {
        return None;
    }

    text[..end].parse().ok()
}
