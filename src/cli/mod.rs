//! Command-line parsing for the salary inflation analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engine code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salari", version, about = "Compare your salary against historical inflation")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Adjust a salary file for inflation, print the report/plots, and optionally export.
    Adjust(AdjustArgs),
    /// List the columns of an input file (to pick the date and salary columns).
    Columns(ColumnsArgs),
    /// Show the inflation reference table in use.
    Reference(ReferenceArgs),
}

/// Options for the adjustment run.
#[derive(Debug, Parser, Clone)]
pub struct AdjustArgs {
    /// Input file (delimited text with a header row). Prompts when omitted.
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Column holding the payment date/period. Prompts when omitted.
    #[arg(short = 'd', long = "date-column", value_name = "COLUMN")]
    pub date_column: Option<String>,

    /// Column holding the paid amount. Prompts when omitted.
    #[arg(short = 's', long = "salary-column", value_name = "COLUMN")]
    pub salary_column: Option<String>,

    /// Inflation reference CSV (`periodo,indice_inflacion`). Defaults to
    /// `$SALARI_INFLATION_CSV`, then the bundled table.
    #[arg(long, value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print only the last N periods of the data table.
    #[arg(long, value_name = "N")]
    pub rows: Option<usize>,

    /// Export the enriched table to CSV.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Export the enriched table and join diagnostics to JSON.
    #[arg(long = "export-json", value_name = "FILE")]
    pub export_json: Option<PathBuf>,
}

/// Options for listing input columns.
#[derive(Debug, Parser)]
pub struct ColumnsArgs {
    /// Input file (delimited text with a header row).
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: PathBuf,
}

/// Options for printing the reference table.
#[derive(Debug, Parser)]
pub struct ReferenceArgs {
    /// Inflation reference CSV. Defaults to `$SALARI_INFLATION_CSV`, then the bundled table.
    #[arg(long, value_name = "FILE")]
    pub reference: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_adjust_flags() {
        let cli = Cli::parse_from([
            "salari",
            "-vv",
            "adjust",
            "-i",
            "sueldos.csv",
            "-d",
            "fecha",
            "-s",
            "monto",
            "--no-plot",
            "--export",
            "out.csv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Adjust(args) = cli.command else {
            panic!("expected adjust");
        };
        assert_eq!(args.input, Some(PathBuf::from("sueldos.csv")));
        assert_eq!(args.date_column.as_deref(), Some("fecha"));
        assert_eq!(args.salary_column.as_deref(), Some("monto"));
        assert!(args.no_plot);
        assert_eq!(args.width, 80);
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
        assert_eq!(args.export_json, None);
    }

    #[test]
    fn columns_requires_input() {
        assert!(Cli::try_parse_from(["salari", "columns"]).is_err());
    }
}
