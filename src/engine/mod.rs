//! Salary adjustment engine.
//!
//! Responsibilities:
//!
//! - project an arbitrary table onto (period, amount) observations
//! - aggregate payments per period and inner-join with the inflation reference
//! - build the adjusted series with a single forward scan
//! - optionally memoize results per input content (caller-owned)

pub mod adjust;
pub mod memo;
pub mod project;

pub use adjust::*;
pub use memo::*;
pub use project::*;
