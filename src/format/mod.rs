//! Output formatting for conversion reports (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::pricing::{ConversionReport, ConvertedRow, RateTable};

/// Shown for rows whose country has no known currency.
const UNKNOWN_CURRENCY: &str = "Unknown";

/// Formats reports and listings for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a conversion report: every row plus the cheapest summary.
    pub fn format_report(&self, report: &ConversionReport) -> String {
        match self.format {
            OutputFormat::Json => self.json(report, "{}"),
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_report(report),
        }
    }

    /// Formats a plain list such as package names or currency codes.
    pub fn format_list(&self, heading: &str, items: &[String]) -> String {
        match self.format {
            OutputFormat::Json => self.json(&items, "[]"),
            OutputFormat::Csv => {
                let mut lines = vec![Self::csv_escape(&heading.to_lowercase())];
                lines.extend(items.iter().map(|i| Self::csv_escape(i)));
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![format!("## {}", heading), String::new()];
                lines.extend(items.iter().map(|i| format!("- {}", i)));
                lines.join("\n")
            }
            OutputFormat::Table => {
                if items.is_empty() {
                    return format!("No {} found.", heading.to_lowercase());
                }
                items.join("\n")
            }
        }
    }

    /// Formats a rate table.
    pub fn format_rates(&self, rates: &RateTable) -> String {
        match self.format {
            OutputFormat::Json => self.json(rates, "{}"),
            OutputFormat::Csv => {
                let mut lines = vec!["currency,rate".to_string()];
                lines.extend(rates.iter().map(|(code, rate)| format!("{},{}", code, rate)));
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![
                    format!("| Currency | Per 1 {} |", rates.base),
                    "|----------|------|".to_string(),
                ];
                lines.extend(rates.iter().map(|(code, rate)| format!("| {} | {} |", code, rate)));
                lines.join("\n")
            }
            OutputFormat::Table => {
                if rates.is_empty() {
                    return format!("No rates available for {}.", rates.base);
                }
                let mut lines = vec![format!("{:<8}  {:>14}", "Currency", format!("Per 1 {}", rates.base))];
                lines.push(format!("{:-<8}  {:-<14}", "", ""));
                lines.extend(rates.iter().map(|(code, rate)| format!("{:<8}  {:>14.4}", code, rate)));
                lines.push(String::new());
                lines.push(format!("Total: {} rates", rates.len()));
                lines.join("\n")
            }
        }
    }

    // JSON formatting

    fn json<T: serde::Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
    }

    // Table formatting

    fn table_report(&self, report: &ConversionReport) -> String {
        if report.converted.is_empty() {
            return "No prices found.".to_string();
        }

        let country_width = 28;
        let price_width = 20;
        let currency_width = 8;
        let converted_header = format!("Converted ({})", report.base);
        let converted_width = converted_header.len().max(12);

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<country_width$}  {:<price_width$}  {:<currency_width$}  {:>converted_width$}",
            "Country", "Price", "Currency", converted_header
        ));
        lines.push(format!(
            "{:-<country_width$}  {:-<price_width$}  {:-<currency_width$}  {:-<converted_width$}",
            "", "", "", ""
        ));

        for row in &report.converted {
            lines.push(format!(
                "{:<country_width$}  {:<price_width$}  {:<currency_width$}  {:>converted_width$}",
                truncate(&row.country, country_width),
                truncate(&row.raw_price.to_string(), price_width),
                currency_label(row),
                row.amount_text()
            ));
        }

        lines.push(String::new());
        lines.extend(self.cheapest_lines(report));
        lines.push(String::new());
        lines.push(format!(
            "Converted: {} of {} rows",
            report.converted_count(),
            report.converted.len()
        ));

        lines.join("\n")
    }

    fn cheapest_lines(&self, report: &ConversionReport) -> Vec<String> {
        if report.cheapest.is_empty() {
            return vec![format!("No prices could be converted to {}.", report.base)];
        }

        let mut lines = vec![format!("Cheapest {} in {}:", report.cheapest.len(), report.base)];
        lines.extend(report.cheapest.iter().map(|e| format!("  {}", e.display(&report.base))));
        lines
    }

    // Markdown formatting

    fn markdown_report(&self, report: &ConversionReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("| Country | Price | Currency | Converted ({}) |", report.base));
        lines.push("|---------|-------|----------|-----------|".to_string());

        for row in &report.converted {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                row.country,
                row.raw_price,
                currency_label(row),
                row.amount_text()
            ));
        }

        lines.push(String::new());
        lines.push(format!("### Cheapest in {}", report.base));
        lines.push(String::new());

        if report.cheapest.is_empty() {
            lines.push("*No prices could be converted.*".to_string());
        } else {
            for (i, entry) in report.cheapest.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, entry.display(&report.base)));
            }
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_report(&self, report: &ConversionReport) -> String {
        let mut lines = vec![format!("country,price,currency,converted_{}", report.base.to_lowercase())];

        for row in &report.converted {
            lines.push(format!(
                "{},{},{},{}",
                Self::csv_escape(&row.country),
                Self::csv_escape(&row.raw_price.to_string()),
                row.currency.as_deref().unwrap_or_default(),
                row.amount_text()
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn currency_label(row: &ConvertedRow) -> &str {
    row.currency.as_deref().unwrap_or(UNKNOWN_CURRENCY)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{convert_all, PriceRow};

    fn make_report() -> ConversionReport {
        let rows = vec![
            PriceRow::new("Japan", "¥1,500"),
            PriceRow::new("Atlantis", "$5"),
            PriceRow::new("Germany", "1.234,56 €"),
        ];
        convert_all(&rows, &RateTable::new("SGD", [("JPY", 110.5), ("EUR", 0.68)]))
    }

    fn empty_report() -> ConversionReport {
        convert_all(&[], &RateTable::empty("SGD"))
    }

    // Table format tests

    #[test]
    fn test_table_report() {
        let output = Formatter::new(OutputFormat::Table).format_report(&make_report());

        assert!(output.contains("Country"));
        assert!(output.contains("Converted (SGD)"));
        assert!(output.contains("13.57"));
        assert!(output.contains("Unknown"));
        assert!(output.contains("N/A"));
        assert!(output.contains("Cheapest 2 in SGD:"));
        assert!(output.contains("  Japan: SGD 13.57"));
        assert!(output.contains("Converted: 2 of 3 rows"));
    }

    #[test]
    fn test_table_cheapest_order() {
        let output = Formatter::new(OutputFormat::Table).format_report(&make_report());
        let japan = output.find("Japan: SGD").unwrap();
        let germany = output.find("Germany: SGD").unwrap();
        assert!(japan < germany);
    }

    #[test]
    fn test_table_empty_report() {
        let output = Formatter::new(OutputFormat::Table).format_report(&empty_report());
        assert_eq!(output, "No prices found.");
    }

    #[test]
    fn test_table_nothing_converted() {
        let rows = vec![PriceRow::new("Japan", "¥1,500")];
        let report = convert_all(&rows, &RateTable::empty("SGD"));
        let output = Formatter::new(OutputFormat::Table).format_report(&report);
        assert!(output.contains("No prices could be converted to SGD."));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("¥¥¥¥¥¥¥¥", 6), "¥¥¥...");
        assert_eq!(truncate("short", 10), "short");
    }

    // JSON format tests

    #[test]
    fn test_json_report() {
        let output = Formatter::new(OutputFormat::Json).format_report(&make_report());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["base"], "SGD");
        assert_eq!(parsed["converted"][0]["amount"], 13.57);
        assert_eq!(parsed["converted"][1]["amount"], "N/A");
        assert!(parsed["converted"][1]["currency"].is_null());
        assert_eq!(parsed["cheapest"][0]["country"], "Japan");
    }

    #[test]
    fn test_json_list() {
        let items = vec!["Basic".to_string(), "Premium".to_string()];
        let output = Formatter::new(OutputFormat::Json).format_list("Packages", &items);
        let parsed: Vec<String> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_json_rates() {
        let rates = RateTable::new("SGD", [("JPY", 110.5)]);
        let output = Formatter::new(OutputFormat::Json).format_rates(&rates);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["base"], "SGD");
        assert_eq!(parsed["rates"]["JPY"], 110.5);
    }

    // Markdown format tests

    #[test]
    fn test_markdown_report() {
        let output = Formatter::new(OutputFormat::Markdown).format_report(&make_report());
        assert!(output.contains("| Country | Price | Currency | Converted (SGD) |"));
        assert!(output.contains("| Japan | ¥1,500 | JPY | 13.57 |"));
        assert!(output.contains("| Atlantis | $5 | Unknown | N/A |"));
        assert!(output.contains("1. Japan: SGD 13.57"));
    }

    #[test]
    fn test_markdown_list() {
        let items = vec!["EUR".to_string()];
        let output = Formatter::new(OutputFormat::Markdown).format_list("Currencies", &items);
        assert_eq!(output, "## Currencies\n\n- EUR");
    }

    // CSV format tests

    #[test]
    fn test_csv_report() {
        let output = Formatter::new(OutputFormat::Csv).format_report(&make_report());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "country,price,currency,converted_sgd");
        assert_eq!(lines[1], "Japan,\"¥1,500\",JPY,13.57");
        assert_eq!(lines[2], "Atlantis,$5,,N/A");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_rates() {
        let rates = RateTable::new("SGD", [("EUR", 0.68), ("JPY", 110.5)]);
        let output = Formatter::new(OutputFormat::Csv).format_rates(&rates);
        assert_eq!(output, "currency,rate\nEUR,0.68\nJPY,110.5");
    }

    #[test]
    fn test_table_list_empty() {
        let output = Formatter::new(OutputFormat::Table).format_list("Packages", &[]);
        assert_eq!(output, "No packages found.");
    }
}
