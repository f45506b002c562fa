//! Reporting utilities: window summary and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Adjustment, Period};

/// How nominal salary ended up relative to the inflation-only path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AboveInflation,
    BelowInflation,
    Even,
}

/// Headline numbers over the matched window.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub first_period: Period,
    pub last_period: Period,
    pub first_salario: f64,
    pub last_salario: f64,
    pub last_ajustado: f64,
    /// Compounded inflation applied between the first and last period (percent).
    pub cumulative_inflation_pct: f64,
    /// Nominal salary change first -> last (percent); `None` if the first salary is 0.
    pub nominal_change_pct: Option<f64>,
    /// Last salary vs its inflation-only counterpart (percent).
    pub real_gap_pct: Option<f64>,
    /// Largest |check_infla - (1 + rate/100)| across the series.
    pub max_check_deviation: f64,
    pub verdict: Verdict,
}

/// Relative tolerance under which the real gap counts as "even".
const EVEN_TOLERANCE_PCT: f64 = 0.05;

/// Summarize an adjustment; `None` when the join produced no records.
pub fn compute_summary(adjustment: &Adjustment) -> Option<Summary> {
    let records = &adjustment.records;
    let first = records.first()?;
    let last = records.last()?;

    // Rates of every period except the last feed the adjusted series.
    let growth: f64 = records[..records.len() - 1]
        .iter()
        .map(|r| 1.0 + r.indice_inflacion / 100.0)
        .product();

    let max_check_deviation = records
        .iter()
        .filter_map(|r| r.check_infla.map(|c| (c - (1.0 + r.indice_inflacion / 100.0)).abs()))
        .fold(0.0, f64::max);

    let real_gap_pct = pct_change(last.salario, last.salario_ajustado);
    let verdict = match real_gap_pct {
        Some(g) if g > EVEN_TOLERANCE_PCT => Verdict::AboveInflation,
        Some(g) if g < -EVEN_TOLERANCE_PCT => Verdict::BelowInflation,
        _ => Verdict::Even,
    };

    Some(Summary {
        first_period: first.periodo,
        last_period: last.periodo,
        first_salario: first.salario,
        last_salario: last.salario,
        last_ajustado: last.salario_ajustado,
        cumulative_inflation_pct: (growth - 1.0) * 100.0,
        nominal_change_pct: pct_change(last.salario, first.salario),
        real_gap_pct,
        max_check_deviation,
        verdict,
    })
}

fn pct_change(to: f64, from: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let v = (to / from - 1.0) * 100.0;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InflationReference, RawObservation};
    use crate::engine::compute;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn documented_example_is_below_inflation() {
        let raw = [
            RawObservation::new(p("2021-03"), 10000.0),
            RawObservation::new(p("2021-04"), 10500.0),
            RawObservation::new(p("2021-05"), 10950.0),
        ];
        let reference =
            InflationReference::from_pairs([(p("2021-03"), 10.0), (p("2021-04"), 15.0), (p("2021-05"), 12.0)])
                .unwrap();
        let adj = compute(&raw, &reference).unwrap();
        let s = compute_summary(&adj).unwrap();

        assert_eq!(s.first_period, p("2021-03"));
        assert_eq!(s.last_period, p("2021-05"));
        assert!((s.cumulative_inflation_pct - 26.5).abs() < 1e-9);
        assert!((s.nominal_change_pct.unwrap() - 9.5).abs() < 1e-9);
        assert!((s.real_gap_pct.unwrap() - (10950.0 / 12650.0 - 1.0) * 100.0).abs() < 1e-9);
        assert!(s.max_check_deviation < 1e-12);
        assert_eq!(s.verdict, Verdict::BelowInflation);
    }

    #[test]
    fn empty_adjustment_has_no_summary() {
        let adj = Adjustment {
            records: vec![],
            observations_used: 1,
            aggregated_periods: 1,
            unmatched_periods: vec![p("2030-01")],
        };
        assert!(compute_summary(&adj).is_none());
    }
}
