//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{AdjustConfig, Adjustment, EnrichedRecord, InflationReference, Projection, RawTable};
use crate::report::{Summary, Verdict};

/// How many row errors / dropped periods to list before eliding.
const MAX_LISTED: usize = 5;

/// Format the run summary (input stats, join diagnostics, headline numbers).
pub fn format_run_summary(
    projection: &Projection,
    adjustment: &Adjustment,
    summary: Option<&Summary>,
    reference: &InflationReference,
    config: &AdjustConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== salari - Salario vs inflación ===\n");
    out.push_str(&format!("Input: {}\n", config.input_path.display()));
    out.push_str(&format!(
        "Columns: period=`{}` amount=`{}`\n",
        config.period_column, config.amount_column
    ));
    out.push_str(&format!(
        "Reference: {} ({} periods, {}..{})\n",
        config
            .reference_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "bundled".to_string()),
        reference.len(),
        fmt_opt_period(reference.first_period()),
        fmt_opt_period(reference.last_period()),
    ));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        projection.rows_read,
        adjustment.observations_used,
        projection.row_errors.len()
    ));
    for e in projection.row_errors.iter().take(MAX_LISTED) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if projection.row_errors.len() > MAX_LISTED {
        out.push_str(&format!("  ... {} more\n", projection.row_errors.len() - MAX_LISTED));
    }

    out.push_str(&format!(
        "Periods: aggregated={} matched={} dropped={}\n",
        adjustment.aggregated_periods,
        adjustment.records.len(),
        adjustment.unmatched_periods.len()
    ));
    if !adjustment.unmatched_periods.is_empty() {
        let listed: Vec<String> = adjustment
            .unmatched_periods
            .iter()
            .take(MAX_LISTED)
            .map(|p| p.to_string())
            .collect();
        let more = adjustment.unmatched_periods.len().saturating_sub(MAX_LISTED);
        out.push_str(&format!(
            "  no inflation rate for: {}{}\n",
            listed.join(", "),
            if more > 0 { format!(" (+{more})") } else { String::new() }
        ));
    }

    if let Some(s) = summary {
        out.push_str("\nWindow:\n");
        out.push_str(&format!("- from {} to {}\n", s.first_period, s.last_period));
        out.push_str(&format!(
            "- first salary       : {}\n",
            fmt_money(s.first_salario)
        ));
        out.push_str(&format!(
            "- last salary        : {} (nominal {})\n",
            fmt_money(s.last_salario),
            fmt_opt_pct(s.nominal_change_pct)
        ));
        out.push_str(&format!(
            "- inflation-adjusted : {} (inflation {})\n",
            fmt_money(s.last_ajustado),
            fmt_pct(s.cumulative_inflation_pct)
        ));
        out.push_str(&format!("- real gap           : {}\n", fmt_opt_pct(s.real_gap_pct)));
        out.push_str(match s.verdict {
            Verdict::AboveInflation => "Salary ended ABOVE inflation.\n",
            Verdict::BelowInflation => "Salary ended BELOW inflation.\n",
            Verdict::Even => "Salary ended in line with inflation.\n",
        });
    }
    out.push('\n');

    out
}

/// Format the enriched records as a fixed-width table.
///
/// `limit` keeps only the last N rows (most recent periods).
pub fn format_records_table(records: &[EnrichedRecord], limit: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<8} {:>14} {:>5} {:>9} {:>14} {:>9} {:>9}\n",
            "periodo", "salario", "n", "inflac%", "ajustado", "check", "salar%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<8} {:-<14} {:-<5} {:-<9} {:-<14} {:-<9} {:-<9}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    let skip = limit.map(|n| records.len().saturating_sub(n)).unwrap_or(0);
    if skip > 0 {
        out.push_str(&format!("... {skip} earlier periods\n"));
    }

    for r in &records[skip..] {
        out.push_str(
            format!(
                "{:<8} {:>14} {:>5} {:>9.2} {:>14} {:>9} {:>9}\n",
                r.periodo.to_string(),
                fmt_money(r.salario),
                r.cantidad_de_ingresos,
                r.indice_inflacion,
                fmt_money(r.salario_ajustado),
                r.check_infla.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string()),
                r.indice_salarial.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string()),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the reference table: coverage line followed by one row per period.
pub fn format_reference(reference: &InflationReference) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Inflation reference: {} periods ({}..{})\n",
        reference.len(),
        fmt_opt_period(reference.first_period()),
        fmt_opt_period(reference.last_period()),
    ));
    out.push_str(&format!("{:<8} {:>8}\n", "periodo", "inflac%"));
    out.push_str(&format!("{:-<8} {:-<8}\n", "", ""));
    for (period, rate) in reference.iter() {
        out.push_str(&format!("{:<8} {:>8.2}\n", period.to_string(), rate));
    }
    out
}

/// List the columns of an uploaded table with a sample value each.
pub fn format_columns(table: &RawTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Delimiter: '{}' | rows: {}\n",
        char::from(table.delimiter).escape_default(),
        table.rows.len()
    ));
    out.push_str(format!("{:<4} {:<24} {}\n", "#", "column", "sample").trim_end());
    out.push('\n');
    for (idx, name) in table.headers.iter().enumerate() {
        out.push_str(
            format!(
                "{:<4} {:<24} {}\n",
                idx + 1,
                truncate(name, 24),
                truncate(table.sample_value(idx).unwrap_or(""), 32)
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Thousands-separated amount with two decimals (`1,234,567.89`).
pub fn fmt_money(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let s = format!("{:.2}", v.abs());
    let (int_part, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && s.bytes().any(|b| b != b'0' && b != b'.') { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn fmt_pct(v: f64) -> String {
    format!("{v:+.2}%")
}

fn fmt_opt_pct(v: Option<f64>) -> String {
    v.map(fmt_pct).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt_period(p: Option<crate::domain::Period>) -> String {
    p.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, RawObservation, RawRow};
    use crate::engine::compute;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn sample() -> (Adjustment, InflationReference) {
        let raw = [
            RawObservation::new(p("2021-03"), 10000.0),
            RawObservation::new(p("2021-04"), 10500.0),
            RawObservation::new(p("2021-05"), 10950.0),
        ];
        let reference =
            InflationReference::from_pairs([(p("2021-03"), 10.0), (p("2021-04"), 15.0), (p("2021-05"), 12.0)])
                .unwrap();
        (compute(&raw, &reference).unwrap(), reference)
    }

    #[test]
    fn money_is_grouped() {
        assert_eq!(fmt_money(0.0), "0.00");
        assert_eq!(fmt_money(999.5), "999.50");
        assert_eq!(fmt_money(1000.0), "1,000.00");
        assert_eq!(fmt_money(1234567.891), "1,234,567.89");
        assert_eq!(fmt_money(-12650.0), "-12,650.00");
        assert_eq!(fmt_money(-0.001), "0.00");
    }

    #[test]
    fn records_table_snapshot() {
        let (adj, _) = sample();
        let txt = format_records_table(&adj.records, None);
        let expected = concat!(
            "periodo         salario     n   inflac%       ajustado     check    salar%\n",
            "-------- -------------- ----- --------- -------------- --------- ---------\n",
            "2021-03       10,000.00     1     10.00      10,000.00    1.1000      5.00\n",
            "2021-04       10,500.00     1     15.00      11,000.00    1.1500      4.29\n",
            "2021-05       10,950.00     1     12.00      12,650.00         -         -\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn records_table_limit_keeps_latest_rows() {
        let (adj, _) = sample();
        let txt = format_records_table(&adj.records, Some(1));
        assert!(txt.contains("... 2 earlier periods"));
        assert!(txt.contains("2021-05"));
        assert!(!txt.contains("2021-03 "));
    }

    #[test]
    fn summary_mentions_dropped_periods_and_verdict() {
        let (mut adj, reference) = sample();
        adj.unmatched_periods = vec![p("2021-06")];
        adj.aggregated_periods = 4;
        let summary = crate::report::compute_summary(&adj);
        let projection = Projection {
            observations: vec![],
            row_errors: vec![],
            rows_read: 4,
        };
        let config = AdjustConfig {
            input_path: "sueldos.csv".into(),
            period_column: "fecha".to_string(),
            amount_column: "sueldo".to_string(),
            reference_path: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            table_rows: None,
            export_csv: None,
            export_json: None,
        };

        let txt = format_run_summary(&projection, &adj, summary.as_ref(), &reference, &config);
        assert!(txt.contains("Reference: bundled (3 periods, 2021-03..2021-05)"));
        assert!(txt.contains("Periods: aggregated=4 matched=3 dropped=1"));
        assert!(txt.contains("no inflation rate for: 2021-06"));
        assert!(txt.contains("inflation +26.50%"));
        assert!(txt.contains("Salary ended BELOW inflation."));
    }

    #[test]
    fn columns_listing_shows_samples() {
        let table = RawTable {
            headers: vec!["fecha".to_string(), "monto".to_string()],
            rows: vec![RawRow {
                line: 2,
                cells: vec!["2021-03-05".to_string(), "10500".to_string()],
            }],
            delimiter: b';',
        };
        let txt = format_columns(&table);
        assert!(txt.starts_with("Delimiter: ';' | rows: 1\n"));
        assert!(txt.contains("1    fecha                    2021-03-05"));
        assert!(txt.contains("2    monto                    10500"));
    }
}
