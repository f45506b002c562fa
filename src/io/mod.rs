//! Input/output helpers.
//!
//! - delimited-text ingest of uploaded tables (`ingest`)
//! - the inflation reference table (`reference`)
//! - result exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;
pub mod reference;

pub use export::*;
pub use ingest::*;
pub use reference::*;
