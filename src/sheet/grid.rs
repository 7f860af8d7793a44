//! CSV/TSV grid backed by the `csv` crate.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Field separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Separator {
    #[default]
    Comma,
    Tab,
}

impl Separator {
    /// Tab for `.tsv` files or when forced, comma otherwise.
    pub fn for_path(path: &Path, force_tsv: bool) -> Self {
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        if force_tsv || is_tsv {
            Separator::Tab
        } else {
            Separator::Comma
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Tab => b'\t',
        }
    }
}

/// A header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Parses text whose first row is the header.
    pub fn parse(text: &str, sep: Separator) -> Result<Self> {
        let mut rows = parse_rows(text, sep)?;
        if rows.is_empty() {
            anyhow::bail!("Sheet is empty");
        }
        let headers = rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect();
        Ok(Self { headers, rows })
    }

    /// Index of the column whose header equals `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the column named `name`, appending it when missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column(name) {
            return index;
        }
        self.headers.push(name.to_string());
        self.headers.len() - 1
    }

    /// Cell text; cells past the end of a short row are blank.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str).unwrap_or("")
    }

    /// Sets a cell, padding the row as needed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value.into();
        }
    }

    /// Writes the header and all rows, quoting fields only where needed.
    pub fn write_to<W: Write>(&self, w: W, sep: Separator) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(sep.as_byte()).flexible(true).from_writer(w);

        writer.write_record(&self.headers).context("Failed to write sheet header")?;
        for row in &self.rows {
            writer.write_record(row).context("Failed to write sheet row")?;
        }
        writer.flush().context("Failed to flush sheet")?;
        Ok(())
    }

    /// Renders the sheet as text.
    pub fn to_text(&self, sep: Separator) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, sep)?;
        String::from_utf8(buf).context("Sheet is not valid UTF-8")
    }
}

/// Splits text into rows of fields. Rows may differ in length; blank lines are skipped.
fn parse_rows(text: &str, sep: Separator) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sep.as_byte())
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed sheet row {}", line + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_quotes_and_crlf() {
        let text = "Country,Price\r\n\"Korea, South\",\"₩10,000\"\r\nJapan,\"say \"\"hi\"\"\"\r\n";
        let rows = parse_rows(text, Separator::Comma).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Korea, South", "₩10,000"]);
        assert_eq!(rows[2], vec!["Japan", "say \"hi\""]);
    }

    #[test]
    fn test_parse_rows_skips_blank_lines() {
        let rows = parse_rows("a,b\n\nc,d", Separator::Comma).unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_parse_tsv() {
        let rows = parse_rows("Country\tPrice\nJapan\t¥1,500\n", Separator::Tab).unwrap();
        assert_eq!(rows[1], vec!["Japan", "¥1,500"]);
    }

    #[test]
    fn test_sheet_parse_empty() {
        assert!(Sheet::parse("", Separator::Comma).is_err());
    }

    #[test]
    fn test_ensure_column_appends_once() {
        let mut sheet = Sheet::parse("Country,Price\nJapan,1\n", Separator::Comma).unwrap();
        assert_eq!(sheet.ensure_column("Currency Code"), 2);
        assert_eq!(sheet.ensure_column("Currency Code"), 2);
        assert_eq!(sheet.headers.len(), 3);
    }

    #[test]
    fn test_set_cell_pads_short_rows() {
        let mut sheet = Sheet::parse("Country,Price,Code\nJapan\n", Separator::Comma).unwrap();
        assert_eq!(sheet.cell(0, 1), "");
        sheet.set_cell(0, 2, "JPY");
        assert_eq!(sheet.rows[0], vec!["Japan", "", "JPY"]);
    }

    #[test]
    fn test_to_text_quotes_when_needed() {
        let mut sheet = Sheet::parse("Country,Price\nJapan,x\n", Separator::Comma).unwrap();
        sheet.set_cell(0, 1, "1,500");
        assert_eq!(sheet.to_text(Separator::Comma).unwrap(), "Country,Price\nJapan,\"1,500\"\n");
        assert_eq!(sheet.to_text(Separator::Tab).unwrap(), "Country\tPrice\nJapan\t1,500\n");
    }

    #[test]
    fn test_ragged_rows_and_multiline_cells_survive_rewrite() {
        let text = "Country,Price,Note\nJapan,\"¥1,500\",\"line one\nline two\"\nPeru,S/. 20\n";
        let sheet = Sheet::parse(text, Separator::Comma).unwrap();
        assert_eq!(sheet.rows[0][2], "line one\nline two");
        assert_eq!(sheet.rows[1].len(), 2);

        let reparsed = Sheet::parse(&sheet.to_text(Separator::Comma).unwrap(), Separator::Comma).unwrap();
        assert_eq!(reparsed, sheet);
    }

    #[test]
    fn test_separator_for_path() {
        assert_eq!(Separator::for_path(Path::new("a.TSV"), false), Separator::Tab);
        assert_eq!(Separator::for_path(Path::new("a.csv"), false), Separator::Comma);
        assert_eq!(Separator::for_path(Path::new("a.csv"), true), Separator::Tab);
    }
}
