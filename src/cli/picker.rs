//! Interactive file and column pickers.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the pickers provide the "run `salari adjust` and choose" UX when the
//!   input file or the period/amount columns were not given as flags
//!
//! The file picker searches for delimited text files under the current directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::domain::RawTable;
use crate::error::AppError;

/// Default directory recursion depth for finding input files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

const INPUT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Prompt the user to select an input file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` / `*.tsv` / `*.txt` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_input_path() -> Result<PathBuf, AppError> {
    let files = discover_input_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found. Provide one with `salari adjust -i <file.csv>`.",
        ));
    }

    println!("Found {} input file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let line = prompt_line(
            &mut input,
            &format!("Select a file by number (1-{}) or type a path (q to quit): ", files.len()),
        )?;

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_input_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_input_path(Path::new(&line)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Prompt on stdin/stdout for one column of `table` (e.g. the FECHA column).
pub fn prompt_for_column(table: &RawTable, role: &str) -> Result<String, AppError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt_for_column_with(table, role, &mut stdin.lock(), &mut stdout)
}

/// Column prompt over arbitrary streams.
pub fn prompt_for_column_with<R: BufRead, W: Write>(
    table: &RawTable,
    role: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String, AppError> {
    if table.headers.is_empty() {
        return Err(AppError::new(2, "Input has no columns to choose from."));
    }

    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));
    writeln!(output, "Columns:").map_err(write_err)?;
    for (idx, name) in table.headers.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, name).map_err(write_err)?;
    }

    loop {
        write!(
            output,
            "{role} column (1-{} or name, q to quit): ",
            table.headers.len()
        )
        .map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                2,
                format!("No input received. Pass the {role} column as a flag."),
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }
        match resolve_column_choice(table, line) {
            Some(name) => return Ok(name),
            None => writeln!(output, "Unknown column: {line}").map_err(write_err)?,
        }
    }
}

/// Map a 1-based number or a column name to the column's header text.
pub fn resolve_column_choice(table: &RawTable, choice: &str) -> Option<String> {
    if let Ok(n) = choice.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| table.headers.get(i))
            .cloned();
    }
    table.column_index(choice).map(|i| table.headers[i].clone())
}

/// Validate the provided path points to a delimited text file.
pub fn validate_input_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("Input file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_input_extension(path) {
        return Err(AppError::new(
            2,
            format!(
                "Expected a .csv/.tsv/.txt file (got: {}). Use -i to pass an input path.",
                path.display()
            ),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover input files under the current directory (deterministic order).
pub fn discover_input_files() -> Vec<PathBuf> {
    find_input_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn prompt_line<R: BufRead>(input: &mut R, prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
    if bytes == 0 {
        return Err(AppError::new(
            2,
            "No input received. Provide an input path with `salari adjust -i <file.csv>`.",
        ));
    }

    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Err(AppError::new(2, "Canceled."));
    }
    Ok(line.to_string())
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn find_input_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_input_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_input_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_input_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file() && has_input_extension(&path) {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;

    fn table() -> RawTable {
        RawTable {
            headers: vec!["Fecha".to_string(), "Concepto".to_string(), "Monto".to_string()],
            rows: vec![RawRow {
                line: 2,
                cells: vec!["2021-03".to_string(), "sueldo".to_string(), "1".to_string()],
            }],
            delimiter: b',',
        }
    }

    #[test]
    fn column_choice_by_number_or_name() {
        let t = table();
        assert_eq!(resolve_column_choice(&t, "1").as_deref(), Some("Fecha"));
        assert_eq!(resolve_column_choice(&t, "monto").as_deref(), Some("Monto"));
        assert_eq!(resolve_column_choice(&t, "0"), None);
        assert_eq!(resolve_column_choice(&t, "4"), None);
        assert_eq!(resolve_column_choice(&t, "sueldo"), None);
    }

    #[test]
    fn column_prompt_retries_until_valid() {
        let t = table();
        let mut input = "nope\n3\n".as_bytes();
        let mut output = Vec::new();
        let chosen = prompt_for_column_with(&t, "SUELDO", &mut input, &mut output).unwrap();
        assert_eq!(chosen, "Monto");

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("  1) Fecha"));
        assert!(shown.contains("Unknown column: nope"));
    }

    #[test]
    fn column_prompt_fails_on_eof_or_quit() {
        let t = table();
        let mut output = Vec::new();
        assert!(prompt_for_column_with(&t, "FECHA", &mut "".as_bytes(), &mut output).is_err());
        assert!(prompt_for_column_with(&t, "FECHA", &mut "q\n".as_bytes(), &mut output).is_err());
    }

    #[test]
    fn input_path_validation() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sueldos.csv");
        let xlsx = dir.path().join("sueldos.xlsx");
        std::fs::write(&csv, "a,b\n").unwrap();
        std::fs::write(&xlsx, "").unwrap();

        assert_eq!(validate_input_path(&csv).unwrap(), csv);
        assert!(validate_input_path(&xlsx).is_err());
        assert!(validate_input_path(dir.path()).is_err());
        assert!(validate_input_path(&dir.path().join("missing.csv")).is_err());
    }
}
