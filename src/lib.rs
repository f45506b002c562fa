//! `salariapp` library crate.
//!
//! The binary (`salari`) is a thin wrapper around this library so that:
//!
//! - the adjustment engine is testable without spawning processes
//! - the engine is reusable by other front-ends (web upload, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
