//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the adjustment pass
//! - exported to JSON/CSV
//! - reloaded later (the results CSV round-trips through `io::export`)

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month: the grouping and join key of the whole pipeline.
///
/// Field order matters: the derived `Ord` is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = String;

    /// Parse a month label or a full date (bucketed to its month).
    ///
    /// Exports from banks and spreadsheets disagree on date formats, so we accept
    /// a small, deterministic set. Anything after the first whitespace is ignored
    /// (`2021-03-01 00:00:00` is a common pandas/Excel rendering).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.split_whitespace().next().unwrap_or("");
        if token.is_empty() {
            return Err("Empty period.".to_string());
        }

        const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
        for fmt in DATE_FMTS {
            if let Ok(d) = NaiveDate::parse_from_str(token, fmt) {
                return Ok(Period::from_date(d));
            }
        }

        // Month-only labels: pin them to day 1 and reuse the date parser.
        let month_forms = [
            (format!("{token}-01"), "%Y-%m-%d"),
            (format!("{token}/01"), "%Y/%m/%d"),
            (format!("01/{token}"), "%d/%m/%Y"),
            (format!("01-{token}"), "%d-%m-%Y"),
        ];
        for (candidate, fmt) in &month_forms {
            if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
                return Ok(Period::from_date(d));
            }
        }

        Err(format!(
            "Invalid period '{token}'. Expected YYYY-MM, MM/YYYY or a date (YYYY-MM-DD, DD/MM/YYYY)."
        ))
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// An uploaded table before any column has been chosen.
///
/// Cells are kept as text: deciding which columns mean "period" and "amount" is
/// the caller's job (see `engine::project`).
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Field delimiter detected while reading (informational).
    pub delimiter: u8,
}

#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawTable {
    /// Resolve a column name to its index: exact match first, then case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
    }

    /// First non-empty cell of a column, for previews.
    pub fn sample_value(&self, idx: usize) -> Option<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.cells.get(idx))
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// One salary payment (base pay, bonus, ...) as read from the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub period: Period,
    pub amount: f64,
}

impl RawObservation {
    pub fn new(period: Period, amount: f64) -> Self {
        Self { period, amount }
    }
}

/// All payments of one period summed together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedObservation {
    pub period: Period,
    pub salario: f64,
    pub cantidad_de_ingresos: usize,
}

/// Monthly inflation rates (percent) keyed by period.
///
/// Invariants: non-empty, one rate per period, every rate finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationReference {
    rates: BTreeMap<Period, f64>,
}

impl InflationReference {
    /// Build a reference table, rejecting duplicates, non-finite rates and empty input.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Period, f64)>) -> Result<Self, String> {
        let mut rates = BTreeMap::new();
        for (period, rate) in pairs {
            if !rate.is_finite() {
                return Err(format!("Non-finite inflation rate for {period}."));
            }
            if rates.insert(period, rate).is_some() {
                return Err(format!("Duplicate inflation rate for {period}."));
            }
        }
        if rates.is_empty() {
            return Err("Inflation reference is empty.".to_string());
        }
        Ok(Self { rates })
    }

    pub fn rate(&self, period: Period) -> Option<f64> {
        self.rates.get(&period).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.rates.keys().next().copied()
    }

    pub fn last_period(&self) -> Option<Period> {
        self.rates.keys().next_back().copied()
    }

    /// Iterate in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.rates.iter().map(|(p, r)| (*p, *r))
    }
}

/// One output row: aggregated salary joined with inflation plus derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub periodo: Period,
    pub salario: f64,
    pub cantidad_de_ingresos: usize,
    /// Inflation rate (percent) of this period.
    pub indice_inflacion: f64,
    /// First salary compounded by the inflation of every earlier period.
    pub salario_ajustado: f64,
    /// Percent change of nominal salary from this period to the next.
    pub indice_salarial: Option<f64>,
    /// `salario_ajustado[i+1] / salario_ajustado[i]`; should equal `1 + rate/100`.
    pub check_infla: Option<f64>,
}

/// Result of one computation: the enriched series plus join diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub records: Vec<EnrichedRecord>,
    /// Raw observations that went into aggregation.
    pub observations_used: usize,
    /// Distinct periods after aggregation (before the join).
    pub aggregated_periods: usize,
    /// Input periods dropped because the reference has no rate for them.
    pub unmatched_periods: Vec<Period>,
}

impl Adjustment {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A row-level problem found while projecting the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Output of projecting a `RawTable` onto (period, amount).
#[derive(Debug, Clone)]
pub struct Projection {
    pub observations: Vec<RawObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct AdjustConfig {
    pub input_path: PathBuf,
    pub period_column: String,
    pub amount_column: String,
    /// Reference table override; `None` means the bundled table.
    pub reference_path: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Limit the printed data table to the last N rows (`None` prints all).
    pub table_rows: Option<usize>,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_accepts_month_labels_and_dates() {
        let expected = Period::new(2021, 3).unwrap();
        for s in [
            "2021-03",
            "2021/03",
            "03/2021",
            "03-2021",
            "2021-03-15",
            "15/03/2021",
            "2021-03-01 00:00:00",
        ] {
            assert_eq!(s.parse::<Period>().unwrap(), expected, "input {s}");
        }
    }

    #[test]
    fn period_rejects_garbage() {
        assert!("".parse::<Period>().is_err());
        assert!("bono".parse::<Period>().is_err());
        assert!("2021-13".parse::<Period>().is_err());
        assert!(Period::new(2021, 0).is_none());
    }

    #[test]
    fn period_orders_chronologically() {
        let a: Period = "2020-12".parse().unwrap();
        let b: Period = "2021-01".parse().unwrap();
        let c: Period = "2021-10".parse().unwrap();
        assert!(a < b && b < c);
        assert_eq!(c.to_string(), "2021-10");
    }

    #[test]
    fn reference_rejects_duplicates_and_empty() {
        let p = Period::new(2021, 3).unwrap();
        assert!(InflationReference::from_pairs([(p, 1.0), (p, 2.0)]).is_err());
        assert!(InflationReference::from_pairs([(p, f64::NAN)]).is_err());
        assert!(InflationReference::from_pairs(std::iter::empty()).is_err());

        let q = Period::new(2021, 4).unwrap();
        let r = InflationReference::from_pairs([(q, 2.0), (p, 1.0)]).unwrap();
        assert_eq!(r.first_period(), Some(p));
        assert_eq!(r.last_period(), Some(q));
        assert_eq!(r.rate(q), Some(2.0));
    }

    #[test]
    fn column_lookup_falls_back_to_case_insensitive() {
        let table = RawTable {
            headers: vec!["Fecha".to_string(), "Sueldo".to_string()],
            rows: vec![RawRow {
                line: 2,
                cells: vec!["2021-03".to_string(), "100".to_string()],
            }],
            delimiter: b',',
        };
        assert_eq!(table.column_index("Sueldo"), Some(1));
        assert_eq!(table.column_index("fecha"), Some(0));
        assert_eq!(table.column_index("monto"), None);
        assert_eq!(table.sample_value(1), Some("100"));
    }
}
