// src/import/csv_parser.rs
//! CSV text to header list + row records

use serde::Serialize;
use tracing::debug;

use super::types::ImportRow;
use crate::error::Result;

/// Number of rows shown when previewing an upload.
pub const PREVIEW_ROW_COUNT: usize = 10;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
}

impl ParsedCsv {
    pub fn preview(&self) -> &[ImportRow] {
        &self.rows[..self.rows.len().min(PREVIEW_ROW_COUNT)]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse delimited text into headers and rows.
///
/// Quoted fields, embedded commas, doubled quotes and CRLF endings follow
/// RFC 4180. Blank lines and rows with only empty cells are dropped. Short
/// rows are padded with empty values, extra trailing cells are ignored.
pub fn parse_csv(text: &str) -> Result<ParsedCsv> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut row = ImportRow::new();
        for (index, header) in headers.iter().enumerate() {
            if row.get(header).is_some() {
                // Duplicate header: the first column wins.
                continue;
            }
            row.insert(header.clone(), record.get(index).unwrap_or(""));
        }
        rows.push(row);
    }

    debug!("Parsed CSV with {} columns and {} rows", headers.len(), rows.len());
    Ok(ParsedCsv { headers, rows })
}
