//! Aggregation, reference join and the inflation-adjusted series.
//!
//! The adjusted series answers "what would the first salary be worth if it had
//! grown exactly at the inflation rate": each step applies the *previous*
//! period's rate to the *previous* adjusted value.
//!
//! ```text
//! ajustado[0] = salario[0]
//! ajustado[i] = ajustado[i-1] * (1 + inflacion[i-1] / 100)
//! ```

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{
    AggregatedObservation, Adjustment, EnrichedRecord, InflationReference, Period, Projection, RawObservation,
    RawTable,
};
use crate::engine::project::project;
use crate::error::EngineError;

/// Run the full adjustment over already-projected observations.
pub fn compute(observations: &[RawObservation], reference: &InflationReference) -> Result<Adjustment, EngineError> {
    if observations.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let aggregated = aggregate(observations);
    let (joined, unmatched_periods) = join_reference(&aggregated, reference);

    if !unmatched_periods.is_empty() {
        warn!(
            dropped = unmatched_periods.len(),
            first = %unmatched_periods[0],
            "periods without an inflation rate were dropped"
        );
    }
    if joined.is_empty() {
        warn!(
            periods = aggregated.len(),
            reference_first = ?reference.first_period().map(|p| p.to_string()),
            reference_last = ?reference.last_period().map(|p| p.to_string()),
            "no input period overlaps the inflation reference"
        );
    }

    let records = enrich(&joined);
    debug!(
        observations = observations.len(),
        periods = aggregated.len(),
        records = records.len(),
        "salary adjustment computed"
    );

    Ok(Adjustment {
        records,
        observations_used: observations.len(),
        aggregated_periods: aggregated.len(),
        unmatched_periods,
    })
}

/// Project the selected columns of `table`, then run `compute`.
pub fn compute_table(
    table: &RawTable,
    period_column: &str,
    amount_column: &str,
    reference: &InflationReference,
) -> Result<(Projection, Adjustment), EngineError> {
    let projection = project(table, period_column, amount_column)?;
    let adjustment = compute(&projection.observations, reference)?;
    Ok((projection, adjustment))
}

/// Group observations by period: sum of amounts and count of payments.
///
/// Output is in ascending period order with unique periods.
pub fn aggregate(observations: &[RawObservation]) -> Vec<AggregatedObservation> {
    let mut groups: BTreeMap<Period, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let entry = groups.entry(obs.period).or_insert((0.0, 0));
        entry.0 += obs.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(period, (salario, count))| AggregatedObservation {
            period,
            salario,
            cantidad_de_ingresos: count,
        })
        .collect()
}

/// Inner join on period. Returns matched rows (with their rate) and the input
/// periods the reference does not cover.
pub fn join_reference(
    aggregated: &[AggregatedObservation],
    reference: &InflationReference,
) -> (Vec<(AggregatedObservation, f64)>, Vec<Period>) {
    let mut joined = Vec::with_capacity(aggregated.len());
    let mut unmatched = Vec::new();
    for obs in aggregated {
        match reference.rate(obs.period) {
            Some(rate) => joined.push((*obs, rate)),
            None => unmatched.push(obs.period),
        }
    }
    (joined, unmatched)
}

/// Build enriched records from joined rows (ascending, unique periods).
pub fn enrich(joined: &[(AggregatedObservation, f64)]) -> Vec<EnrichedRecord> {
    // Accumulator carries the previous (adjusted value, rate).
    let adjusted: Vec<f64> = joined
        .iter()
        .scan(None::<(f64, f64)>, |prev, (obs, rate)| {
            let value = match *prev {
                None => obs.salario,
                Some((prev_adjusted, prev_rate)) => prev_adjusted * (1.0 + prev_rate / 100.0),
            };
            *prev = Some((value, *rate));
            Some(value)
        })
        .collect();

    joined
        .iter()
        .zip(&adjusted)
        .enumerate()
        .map(|(i, ((obs, rate), &salario_ajustado))| {
            let next = joined.get(i + 1).map(|(n, _)| n.salario).zip(adjusted.get(i + 1).copied());
            EnrichedRecord {
                periodo: obs.period,
                salario: obs.salario,
                cantidad_de_ingresos: obs.cantidad_de_ingresos,
                indice_inflacion: *rate,
                salario_ajustado,
                indice_salarial: next
                    .and_then(|(next_salario, _)| ratio(next_salario, obs.salario))
                    .map(|r| (r - 1.0) * 100.0),
                check_infla: next.and_then(|(_, next_adjusted)| ratio(next_adjusted, salario_ajustado)),
            }
        })
        .collect()
}

/// `num / den`, or `None` when the quotient is undefined.
fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let r = num / den;
    if r.is_finite() { Some(r) } else { None }
}
