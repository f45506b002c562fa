//! Inflation reference table (period -> monthly rate in percent).
//!
//! A default table (monthly CPI variation, 2017-01..2023-12) is compiled into
//! the binary. It can be replaced per run with `--reference` or the
//! `SALARI_INFLATION_CSV` environment variable (a `.env` file is honored).
//!
//! Schema: a header row with `periodo` and `indice_inflacion`; other columns
//! are ignored.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{InflationReference, Period};
use crate::error::AppError;
use crate::io::ingest::sniff_delimiter;

pub const REFERENCE_ENV_VAR: &str = "SALARI_INFLATION_CSV";

const PERIOD_COLUMN: &str = "periodo";
const RATE_COLUMN: &str = "indice_inflacion";

static BUNDLED_REFERENCE: &str = include_str!("../../data/inflacion.csv");

/// Resolve which reference file to use: explicit path, then environment, then bundled (`None`).
///
/// `.env` is loaded once by `app::run`; this only reads the process environment.
pub fn resolve_reference_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    std::env::var_os(REFERENCE_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Load the reference table from `path`, or the bundled table when `None`.
pub fn load_reference(path: Option<&Path>) -> Result<InflationReference, AppError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                AppError::new(
                    2,
                    format!("Failed to open inflation reference '{}': {e}", path.display()),
                )
            })?;
            parse_reference(file).map_err(|e| AppError::new(e.exit_code(), format!("{} ({})", e, path.display())))
        }
        None => bundled_reference(),
    }
}

pub fn bundled_reference() -> Result<InflationReference, AppError> {
    parse_reference(BUNDLED_REFERENCE.as_bytes())
}

/// Parse a reference table from delimited text.
pub fn parse_reference<R: Read>(mut reader: R) -> Result<InflationReference, AppError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| AppError::new(2, format!("Failed to read inflation reference: {e}")))?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&text))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read inflation reference header: {e}")))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::new(2, format!("Inflation reference is missing column `{name}`.")))
    };
    let period_idx = find(PERIOD_COLUMN)?;
    let rate_idx = find(RATE_COLUMN)?;

    let mut pairs = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("Inflation reference parse error on line {line}: {e}")))?;

        let raw_period = record.get(period_idx).unwrap_or("");
        let raw_rate = record.get(rate_idx).unwrap_or("");
        if raw_period.is_empty() && raw_rate.is_empty() {
            continue;
        }

        let period: Period = raw_period
            .parse()
            .map_err(|e| AppError::new(2, format!("Inflation reference line {line}: {e}")))?;
        let rate = parse_rate(raw_rate).ok_or_else(|| {
            AppError::new(
                2,
                format!("Inflation reference line {line}: invalid rate '{raw_rate}'."),
            )
        })?;
        pairs.push((period, rate));
    }

    let reference = InflationReference::from_pairs(pairs).map_err(|e| AppError::new(2, e))?;
    debug!(
        periods = reference.len(),
        first = ?reference.first_period().map(|p| p.to_string()),
        last = ?reference.last_period().map(|p| p.to_string()),
        "loaded inflation reference"
    );
    Ok(reference)
}

/// Parse a monthly rate in percent (`4.8`, `4,8`, `2,125`, `6 %`).
///
/// Rates carry no thousands separators, so a single `.` or `,` is always the
/// decimal mark. A cell with both is rejected.
fn parse_rate(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace() && *c != '%').collect();
    if cleaned.is_empty() || (cleaned.contains('.') && cleaned.contains(',')) {
        return None;
    }
    let v = cleaned.replace(',', ".").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_table_is_monthly_and_contiguous() {
        let r = bundled_reference().unwrap();
        assert_eq!(r.first_period(), Period::new(2017, 1));
        assert_eq!(r.last_period(), Period::new(2023, 12));
        assert_eq!(r.len(), 7 * 12);
        assert_eq!(r.rate(Period::new(2023, 12).unwrap()), Some(25.5));
    }

    #[test]
    fn parses_semicolon_and_decimal_comma() {
        let input = "Periodo;Indice_Inflacion;fuente\n2021-03;4,8;x\n2021-04;4,1;x\n";
        let r = parse_reference(input.as_bytes()).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.rate(Period::new(2021, 3).unwrap()), Some(4.8));
    }

    #[test]
    fn three_decimal_comma_rates_are_not_thousands() {
        let input = "periodo;indice_inflacion\n2021-03;2,125\n2021-04;2,5\n";
        let r = parse_reference(input.as_bytes()).unwrap();
        assert_eq!(r.rate(Period::new(2021, 3).unwrap()), Some(2.125));
        assert_eq!(r.rate(Period::new(2021, 4).unwrap()), Some(2.5));
    }

    #[test]
    fn rate_cells_with_both_separators_are_rejected() {
        assert_eq!(parse_rate("6 %"), Some(6.0));
        assert_eq!(parse_rate("-0,3"), Some(-0.3));
        assert_eq!(parse_rate("1.234,5"), None);

        let err = parse_reference("periodo;indice_inflacion\n2021-03;1.234,5\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid rate"), "{err}");
    }

    #[test]
    fn rejects_missing_columns_and_duplicates() {
        let err = parse_reference("fecha,tasa\n2021-03,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("periodo"));

        let err = parse_reference("periodo,indice_inflacion\n2021-03,1\n2021-03,2\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        let err = parse_reference("periodo,indice_inflacion\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn loads_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inflacion.csv");
        std::fs::write(&path, "periodo,indice_inflacion\n2024-01,20.6\n").unwrap();
        let r = load_reference(Some(&path)).unwrap();
        assert_eq!(r.len(), 1);

        let explicit = resolve_reference_path(Some(path.clone()));
        assert_eq!(explicit, Some(path));
    }

    #[test]
    fn environment_override_is_read_from_the_process_env() {
        // No other test resolves the reference without an explicit path.
        unsafe { std::env::set_var(REFERENCE_ENV_VAR, "/tmp/inflacion_override.csv") };
        let resolved = resolve_reference_path(None);
        unsafe { std::env::remove_var(REFERENCE_ENV_VAR) };
        assert_eq!(resolved, Some(PathBuf::from("/tmp/inflacion_override.csv")));
        assert_eq!(resolve_reference_path(None), None);
    }
}
