//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - reads the uploaded table and resolves the period/amount columns
//! - runs the adjustment pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::picker;
use crate::cli::{AdjustArgs, ColumnsArgs, Command, ReferenceArgs};
use crate::domain::AdjustConfig;
use crate::error::AppError;
use crate::io::{load_reference, read_table, resolve_reference_path};

pub mod pipeline;

/// Entry point for the `salari` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `salari` (or `salari -i file.csv ...`) to behave like
    // `salari adjust ...`, which then prompts for whatever is missing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Adjust(args) => handle_adjust(args),
        Command::Columns(args) => handle_columns(args),
        Command::Reference(args) => handle_reference(args),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_adjust(args: AdjustArgs) -> Result<(), AppError> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => picker::prompt_for_input_path()?,
    };
    let table = read_table(&input)?;

    let period_column = match &args.date_column {
        Some(c) => c.clone(),
        None => picker::prompt_for_column(&table, "FECHA")?,
    };
    let amount_column = match &args.salary_column {
        Some(c) => c.clone(),
        None => picker::prompt_for_column(&table, "SUELDO")?,
    };

    let config = adjust_config_from_args(&args, input, period_column, amount_column);
    let reference = load_reference(config.reference_path.as_deref())?;
    let run = pipeline::run_adjust_with(&config, &table, reference)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &run.projection,
            &run.adjustment,
            run.summary.as_ref(),
            &run.reference,
            &config
        )
    );

    if run.adjustment.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "No period of the input overlaps the inflation reference ({}..{}).",
                run.reference.first_period().map(|p| p.to_string()).unwrap_or_default(),
                run.reference.last_period().map(|p| p.to_string()).unwrap_or_default(),
            ),
        ));
    }

    if config.plot {
        println!(
            "{}",
            crate::plot::render_salary_plot(&run.adjustment.records, config.plot_width, config.plot_height)
        );
        println!(
            "{}",
            crate::plot::render_index_plot(&run.adjustment.records, config.plot_width, config.plot_height)
        );
    }

    println!(
        "{}",
        crate::report::format_records_table(&run.adjustment.records, config.table_rows)
    );

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_results_csv(path, &run.adjustment.records)?;
        info!(path = %path.display(), "wrote results CSV");
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_results_json(path, &run.adjustment)?;
        info!(path = %path.display(), "wrote results JSON");
    }

    Ok(())
}

fn handle_columns(args: ColumnsArgs) -> Result<(), AppError> {
    let table = read_table(&args.input)?;
    println!("{}", crate::report::format_columns(&table));
    Ok(())
}

fn handle_reference(args: ReferenceArgs) -> Result<(), AppError> {
    let path = resolve_reference_path(args.reference);
    let reference = load_reference(path.as_deref())?;
    println!("{}", crate::report::format_reference(&reference));
    Ok(())
}

pub fn adjust_config_from_args(
    args: &AdjustArgs,
    input_path: PathBuf,
    period_column: String,
    amount_column: String,
) -> AdjustConfig {
    AdjustConfig {
        input_path,
        period_column,
        amount_column,
        reference_path: resolve_reference_path(args.reference.clone()),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        table_rows: args.rows,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `salari` defaults to `salari adjust`.
///
/// Rules:
/// - `salari`                        -> `salari adjust`
/// - `salari -i f.csv ...`           -> `salari adjust -i f.csv ...`
/// - `salari --help/--version/-h`    -> unchanged (show top-level help/version)
/// - `salari [-v] <subcommand> ...`  -> unchanged
///
/// Only leading `-v`/`--verbose` flags are skipped before looking at the first
/// token, so a flag value that happens to be a subcommand name is left alone.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(first) = argv
        .iter()
        .skip(1)
        .position(|a| !is_verbose_flag(a))
        .map(|i| i + 1)
    else {
        argv.push("adjust".to_string());
        return argv;
    };
    let token = argv[first].as_str();

    let is_top_level_help_or_version = matches!(token, "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = matches!(token, "adjust" | "columns" | "reference");
    if is_top_level_help_or_version || is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "adjust flags".
    if token.starts_with('-') {
        argv.insert(first, "adjust".to_string());
        return argv;
    }

    // Otherwise, leave as-is and let clap report it.
    argv
}

fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose"
        || arg
            .strip_prefix('-')
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c == 'v'))
}
