//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the join key (`Period`)
//! - input shapes (`RawTable`, `RawObservation`, `AggregatedObservation`)
//! - the reference series (`InflationReference`)
//! - outputs (`EnrichedRecord`, `Adjustment`) and run configuration (`AdjustConfig`)

pub mod types;

pub use types::*;
