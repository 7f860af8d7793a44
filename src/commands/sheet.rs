//! Sheet commands: currency code mapping and price conversion on CSV/TSV files.

use super::{open_cache, rate_note, today, Output};
use crate::config::Config;
use crate::format::Formatter;
use crate::fx::{self, load_rates, RateCache, RateSource};
use crate::pricing;
use crate::sheet::{self, Separator, Sheet};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a rewritten sheet goes.
#[derive(Debug, Clone, Default)]
pub struct SheetTarget {
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    /// Force tab separation
    pub tsv: bool,
}

/// Runs spreadsheet conversions.
pub struct SheetCommand {
    config: Config,
}

impl SheetCommand {
    /// Creates a new sheet command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fills the "Currency Code" column.
    pub fn map_codes(&self, path: &Path, target: &SheetTarget) -> Result<Output> {
        let (mut sheet, sep) = read_sheet(path, target.tsv)?;

        let resolved = sheet::map_currency_codes(&mut sheet)?;
        info!("Resolved currency codes for {} of {} rows", resolved, sheet.rows.len());

        let mut output = write_sheet(&sheet, sep, target)?;
        let unresolved = sheet.rows.len() - resolved;
        if unresolved > 0 {
            output.notes.push(format!("{} rows have no known currency", unresolved));
        }
        Ok(output)
    }

    /// Converts the price column and writes the converted column.
    pub async fn convert(&self, path: &Path, target: &SheetTarget) -> Result<Output> {
        let source = fx::rate_source(&self.config).context("Failed to create rate source")?;
        let mut cache = open_cache(&self.config);
        self.convert_with(source.as_ref(), &mut cache, path, target, today()).await
    }

    /// Converts with a provided rate source and cache (for testing).
    pub async fn convert_with<S: RateSource + ?Sized>(
        &self,
        source: &S,
        cache: &mut RateCache,
        path: &Path,
        target: &SheetTarget,
        today: NaiveDate,
    ) -> Result<Output> {
        let base = fx::normalize_base(&self.config.base_currency)?;
        let (mut sheet, sep) = read_sheet(path, target.tsv)?;

        let rows = sheet::price_rows(&sheet, &self.config.sheet_price_header)?;
        let symbols = pricing::required_codes(&rows);
        info!("Converting {} rows ({} currencies)", rows.len(), symbols.len());

        let loaded = load_rates(source, cache, &base, &symbols, today).await;
        let report = pricing::convert_all_top(&rows, &loaded.table, self.config.top_n);

        sheet::write_converted(&mut sheet, &report);

        let mut output = write_sheet(&sheet, sep, target)?;
        if target.output.is_some() {
            output.text = Formatter::new(self.config.format).format_report(&report);
        }
        output.notes.extend(rate_note(&loaded));
        Ok(output)
    }
}

fn read_sheet(path: &Path, force_tsv: bool) -> Result<(Sheet, Separator)> {
    let sep = Separator::for_path(path, force_tsv);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sheet: {}", path.display()))?;
    let sheet =
        Sheet::parse(&text, sep).with_context(|| format!("Failed to parse sheet: {}", path.display()))?;
    Ok((sheet, sep))
}

/// Writes the sheet to the target file, or returns it as text for stdout.
fn write_sheet(sheet: &Sheet, sep: Separator, target: &SheetTarget) -> Result<Output> {
    match &target.output {
        Some(out) => {
            std::fs::write(out, sheet.to_text(sep)?)
                .with_context(|| format!("Failed to write sheet: {}", out.display()))?;
            let mut output = Output::default();
            output.notes.push(format!("Wrote {}", out.display()));
            Ok(output)
        }
        None => Ok(Output::new(sheet.to_text(sep)?.trim_end().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::fx::RateSourceError;
    use crate::pricing::RateTable;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Mock source recording the symbols it was asked for.
    struct MockRates {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RateSource for MockRates {
        async fn fetch(&self, base: &str, symbols: &[String]) -> Result<RateTable, RateSourceError> {
            if let Ok(mut requested) = self.requested.lock() {
                *requested = symbols.to_vec();
            }
            Ok(RateTable::new(base, [("JPY", 110.5), ("EUR", 0.68)]))
        }

        fn name(&self) -> &'static str {
            "mock"
        }

        fn needs_symbols(&self) -> bool {
            true
        }
    }

    const SHEET: &str = "Country,Premium+ Tier Annual Pricing (Web)\nJapan,\"¥1,500\"\nGermany,\"10,00 €\"\nFrance,12 €\nAtlantis,$5\n";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn test_sheet_convert_to_stdout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, SHEET).unwrap();

        let source = MockRates { requested: Mutex::new(Vec::new()) };
        let mut cache = RateCache::in_memory();
        let cmd = SheetCommand::new(Config::default());

        let output = cmd
            .convert_with(&source, &mut cache, &path, &SheetTarget::default(), day())
            .await
            .unwrap();

        let lines: Vec<&str> = output.text.lines().collect();
        assert_eq!(lines[0], "Country,Premium+ Tier Annual Pricing (Web),Converted Price in SGD");
        assert_eq!(lines[1], "Japan,\"¥1,500\",13.57");
        assert_eq!(lines[2], "Germany,\"10,00 €\",14.71");
        assert_eq!(lines[4], "Atlantis,$5,N/A");
        assert_eq!(*source.requested.lock().unwrap(), vec!["EUR", "JPY"]);
    }

    #[tokio::test]
    async fn test_sheet_convert_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.tsv");
        std::fs::write(&path, SHEET.replace(',', "\t").replace("\"¥1\t500\"", "¥1,500")).unwrap();
        let out = dir.path().join("out.tsv");

        let source = MockRates { requested: Mutex::new(Vec::new()) };
        let mut cache = RateCache::in_memory();
        let cmd = SheetCommand::new(Config { format: OutputFormat::Csv, ..Config::default() });
        let target = SheetTarget { output: Some(out.clone()), tsv: false };

        let output = cmd.convert_with(&source, &mut cache, &path, &target, day()).await.unwrap();

        assert!(output.text.starts_with("country,price,currency,converted_sgd"));
        assert!(output.notes[0].starts_with("Wrote"));

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.lines().next().unwrap().ends_with("\tConverted Price in SGD"));
        assert!(written.contains("Japan\t¥1,500\t13.57"));
    }

    #[tokio::test]
    async fn test_sheet_convert_custom_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "Country,Price\nJapan,¥221\n").unwrap();

        let source = MockRates { requested: Mutex::new(Vec::new()) };
        let mut cache = RateCache::in_memory();
        let cmd = SheetCommand::new(Config { sheet_price_header: "Price".into(), ..Config::default() });

        let output = cmd
            .convert_with(&source, &mut cache, &path, &SheetTarget::default(), day())
            .await
            .unwrap();
        assert!(output.text.ends_with("Japan,¥221,2.00"));
    }

    #[tokio::test]
    async fn test_sheet_convert_missing_price_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "Country,Price\nJapan,1\n").unwrap();

        let source = MockRates { requested: Mutex::new(Vec::new()) };
        let mut cache = RateCache::in_memory();
        let cmd = SheetCommand::new(Config::default());

        let err = cmd
            .convert_with(&source, &mut cache, &path, &SheetTarget::default(), day())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Premium+ Tier Annual Pricing (Web)"));
    }

    #[test]
    fn test_map_codes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, SHEET).unwrap();

        let cmd = SheetCommand::new(Config::default());
        let output = cmd.map_codes(&path, &SheetTarget::default()).unwrap();

        let lines: Vec<&str> = output.text.lines().collect();
        assert!(lines[0].ends_with(",Currency Code"));
        assert!(lines[1].ends_with(",JPY"));
        assert!(lines[4].ends_with(",$5,"));
        assert_eq!(output.notes, vec!["1 rows have no known currency"]);
    }

    #[test]
    fn test_map_codes_missing_file() {
        let cmd = SheetCommand::new(Config::default());
        let err = cmd.map_codes(Path::new("/nonexistent/prices.csv"), &SheetTarget::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read sheet"));
    }
}
