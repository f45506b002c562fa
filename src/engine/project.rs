//! Column projection: uploaded table -> `RawObservation`s.
//!
//! The caller names one period column and one amount column; every other column
//! is ignored. Bad rows are skipped but reported (line + reason), and a column
//! that yields nothing usable is rejected before any computation happens.

use tracing::{debug, warn};

use crate::domain::{Period, Projection, RawObservation, RawTable, RowError};
use crate::error::EngineError;

/// Project `table` onto `(period, amount)` using the selected columns.
pub fn project(table: &RawTable, period_column: &str, amount_column: &str) -> Result<Projection, EngineError> {
    let period_idx = table
        .column_index(period_column)
        .ok_or_else(|| EngineError::MissingColumn {
            column: period_column.to_string(),
        })?;
    let amount_idx = table
        .column_index(amount_column)
        .ok_or_else(|| EngineError::MissingColumn {
            column: amount_column.to_string(),
        })?;

    if table.rows.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let mut observations = Vec::with_capacity(table.rows.len());
    let mut row_errors = Vec::new();

    // Per-column tallies, used to tell a wrong column choice from a few bad rows.
    let mut period_cells = 0usize;
    let mut periods_ok = 0usize;
    let mut amount_cells = 0usize;
    let mut amounts_ok = 0usize;

    for row in &table.rows {
        let period_cell = cell(&row.cells, period_idx);
        let amount_cell = cell(&row.cells, amount_idx);

        let period = period_cell.map(|s| {
            period_cells += 1;
            s.parse::<Period>().inspect(|_| periods_ok += 1)
        });
        let amount = amount_cell.map(|s| {
            amount_cells += 1;
            parse_amount(s)
                .inspect(|_| amounts_ok += 1)
                .ok_or_else(|| format!("Invalid amount '{s}'."))
        });

        match (period, amount) {
            (Some(Ok(period)), Some(Ok(amount))) => observations.push(RawObservation::new(period, amount)),
            (None, _) => row_errors.push(RowError {
                line: row.line,
                message: format!("Missing `{period_column}` value."),
            }),
            (_, None) => row_errors.push(RowError {
                line: row.line,
                message: format!("Missing `{amount_column}` value."),
            }),
            (Some(Err(e)), _) | (_, Some(Err(e))) => row_errors.push(RowError {
                line: row.line,
                message: e,
            }),
        }
    }

    if observations.is_empty() {
        if amount_cells > 0 && amounts_ok == 0 {
            return Err(EngineError::NonNumericColumn {
                column: amount_column.to_string(),
            });
        }
        if period_cells > 0 && periods_ok == 0 {
            return Err(EngineError::UnparseablePeriods {
                column: period_column.to_string(),
            });
        }
        return Err(EngineError::EmptyInput);
    }

    if !row_errors.is_empty() {
        warn!(
            skipped = row_errors.len(),
            used = observations.len(),
            "skipped input rows with unusable period/amount"
        );
    }
    debug!(rows = table.rows.len(), observations = observations.len(), "projected input table");

    Ok(Projection {
        observations,
        row_errors,
        rows_read: table.rows.len(),
    })
}

fn cell(cells: &[String], idx: usize) -> Option<&str> {
    cells.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Parse a money amount as exported by banks/spreadsheets.
///
/// Accepts a `$` sign, inner spaces, thousands separators and decimal commas:
/// `10500`, `$ 10500`, `10,500.50`, `10.500,50`, `10500,5`.
/// A lone comma followed by exactly three digits is read as a thousands
/// separator (`10,500` = 10500). A lone dot is always decimal.
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace() && *c != '$').collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(comma)) => {
            let decimals = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && decimals != 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let v = normalized.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
