//! Delimited-text ingest into a `RawTable`.
//!
//! Uploaded salary files come from banks, payroll portals and spreadsheets, so
//! the column layout is unknown ahead of time and the delimiter varies by locale
//! (`;` is common wherever `,` is the decimal separator).
//!
//! Design goals:
//! - **No schema assumptions**: every column is kept as text; the caller picks
//!   the period and amount columns afterwards
//! - **Deterministic delimiter sniffing** from the header line
//! - **Clear errors** (exit code 2) for unreadable files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::{RawRow, RawTable};
use crate::error::AppError;

/// Delimiters we try, in tie-break order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Read a delimited text file with a header row.
pub fn read_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;
    read_table_from_reader(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{} ({})", e, path.display())))
}

/// Same as `read_table`, for any reader (uploads held in memory, tests).
pub fn read_table_from_reader<R: Read>(mut reader: R) -> Result<RawTable, AppError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
    let text = String::from_utf8(bytes).map_err(|_| AppError::new(2, "Input is not valid UTF-8 text."))?;

    let delimiter = sniff_delimiter(&text);
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read header row: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::new(2, "Input has no header row."));
    }

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error: {e}")))?;
        // Fallback: records() starts after the header and lines are 1-based.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(RawRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    debug!(
        columns = headers.len(),
        rows = rows.len(),
        delimiter = %char::from(delimiter).escape_default(),
        "read input table"
    );

    Ok(RawTable {
        headers,
        rows,
        delimiter,
    })
}

/// Pick the candidate delimiter that occurs most often (outside quotes) in the
/// first non-blank line. Falls back to `,`.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(header) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for b in header.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d == b) {
            counts[i] += 1;
        }
    }

    // `max_by_key` keeps the last maximum; iterate in reverse so ties favor earlier candidates.
    CANDIDATE_DELIMITERS
        .iter()
        .zip(counts)
        .rev()
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(&d, _)| d)
        .unwrap_or(b',')
}

fn normalize_header_name(name: &str) -> String {
    // Excel emits UTF-8 CSVs with a BOM prefix on the first header. If we don't
    // strip it, column selection by name fails for the first column.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
