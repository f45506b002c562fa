//! Shared "adjust pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read table -> load reference -> project columns -> aggregate/join/adjust -> summary
//!
//! The CLI can then focus on presentation (prompts, printing, exports).

use tracing::info;

use crate::domain::{AdjustConfig, Adjustment, InflationReference, Projection, RawTable};
use crate::engine::compute_table;
use crate::error::AppError;
use crate::report::{Summary, compute_summary};

/// All computed outputs of a single `salari adjust` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub reference: InflationReference,
    pub projection: Projection,
    pub adjustment: Adjustment,
    pub summary: Option<Summary>,
}

/// Execute the pipeline on an already-read table and reference.
///
/// The table is read before the columns are known (the CLI may prompt for
/// them), so the caller owns both reads.
pub fn run_adjust_with(
    config: &AdjustConfig,
    table: &RawTable,
    reference: InflationReference,
) -> Result<RunOutput, AppError> {
    let (projection, adjustment) =
        compute_table(table, &config.period_column, &config.amount_column, &reference)?;
    let summary = compute_summary(&adjustment);

    info!(
        rows = projection.rows_read,
        periods = adjustment.aggregated_periods,
        matched = adjustment.records.len(),
        "adjustment pipeline finished"
    );

    Ok(RunOutput {
        reference,
        projection,
        adjustment,
        summary,
    })
}
