//! Export enriched records to CSV/JSON.
//!
//! The CSV layout is meant to be easy to consume in spreadsheets and can be read
//! back with `read_results_csv`. Floats are written with Rust's shortest
//! round-trip formatting, so reading an export back yields identical values.
//! Undefined trailing metrics are written as empty cells.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Adjustment, EnrichedRecord, Period};
use crate::error::AppError;

pub const RESULTS_HEADER: [&str; 7] = [
    "periodo",
    "salario",
    "cantidad de ingresos",
    "indice_inflacion",
    "salario_ajustado",
    "check_infla",
    "indice_salarial",
];

/// JSON export: the enriched series plus join diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub version: String,
    pub adjustment: Adjustment,
}

/// Write enriched records to a CSV file.
pub fn write_results_csv(path: &Path, records: &[EnrichedRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results_csv_to(file, records)
}

pub fn write_results_csv_to<W: Write>(writer: W, records: &[EnrichedRecord]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(RESULTS_HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        wtr.write_record([
            r.periodo.to_string(),
            r.salario.to_string(),
            r.cantidad_de_ingresos.to_string(),
            r.indice_inflacion.to_string(),
            r.salario_ajustado.to_string(),
            fmt_opt(r.check_infla),
            fmt_opt(r.indice_salarial),
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Read a CSV produced by `write_results_csv`.
pub fn read_results_csv(path: &Path) -> Result<Vec<EnrichedRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results CSV '{}': {e}", path.display())))?;
    read_results_from_reader(file)
}

pub fn read_results_from_reader<R: Read>(reader: R) -> Result<Vec<EnrichedRecord>, AppError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read results CSV header: {e}")))?;
    if !headers.iter().eq(RESULTS_HEADER) {
        return Err(AppError::new(
            2,
            format!("Unexpected results CSV header. Expected: {}", RESULTS_HEADER.join(",")),
        ));
    }

    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Results CSV parse error on line {line}: {e}")))?;
        let field = |i: usize| record.get(i).unwrap_or("");
        let bad = |name: &str, e: String| AppError::new(2, format!("Results CSV line {line}, `{name}`: {e}"));

        out.push(EnrichedRecord {
            periodo: field(0).parse::<Period>().map_err(|e| bad("periodo", e))?,
            salario: parse_f64(field(1)).map_err(|e| bad("salario", e))?,
            cantidad_de_ingresos: field(2)
                .parse::<usize>()
                .map_err(|e| bad("cantidad de ingresos", e.to_string()))?,
            indice_inflacion: parse_f64(field(3)).map_err(|e| bad("indice_inflacion", e))?,
            salario_ajustado: parse_f64(field(4)).map_err(|e| bad("salario_ajustado", e))?,
            check_infla: parse_opt_f64(field(5)).map_err(|e| bad("check_infla", e))?,
            indice_salarial: parse_opt_f64(field(6)).map_err(|e| bad("indice_salarial", e))?,
        });
    }
    Ok(out)
}

/// Write the JSON export (records + diagnostics).
pub fn write_results_json(path: &Path, adjustment: &Adjustment) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = ResultsFile {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        adjustment: adjustment.clone(),
    };

    serde_json::to_writer_pretty(file, &doc).map_err(|e| {
        // Anything but an IO failure means the document itself could not be encoded.
        let code = if e.is_io() { 2 } else { 4 };
        AppError::new(code, format!("Failed to write export JSON: {e}"))
    })?;
    Ok(())
}

pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse::<f64>().map_err(|e| format!("'{s}': {e}"))
}

fn parse_opt_f64(s: &str) -> Result<Option<f64>, String> {
    if s.is_empty() { Ok(None) } else { parse_f64(s).map(Some) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InflationReference, RawObservation};
    use crate::engine::compute;

    fn sample_adjustment() -> Adjustment {
        let p = |s: &str| s.parse::<Period>().unwrap();
        let raw = [
            RawObservation::new(p("2021-03"), 6000.0),
            RawObservation::new(p("2021-03"), 4000.0),
            RawObservation::new(p("2021-04"), 10500.0),
            RawObservation::new(p("2021-05"), 10950.33),
        ];
        let reference =
            InflationReference::from_pairs([(p("2021-03"), 10.0), (p("2021-04"), 15.0), (p("2021-05"), 12.0)])
                .unwrap();
        compute(&raw, &reference).unwrap()
    }

    fn csv_bytes(records: &[EnrichedRecord]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_results_csv_to(&mut buf, records).unwrap();
        buf
    }

    #[test]
    fn csv_has_expected_header_and_blank_trailing_metrics() {
        let adj = sample_adjustment();
        let text = String::from_utf8(csv_bytes(&adj.records)).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("periodo,salario,cantidad de ingresos,indice_inflacion,salario_ajustado,check_infla,indice_salarial")
        );
        assert!(lines.next().unwrap().starts_with("2021-03,10000,2,10,10000,"));
        let last = lines.last().unwrap();
        assert!(last.ends_with(",,"), "{last}");
    }

    #[test]
    fn csv_export_reads_back_identically() {
        let adj = sample_adjustment();
        let bytes = csv_bytes(&adj.records);
        let back = read_results_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(back, adj.records);
    }

    #[test]
    fn rejects_foreign_header() {
        let err = read_results_from_reader("a,b\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn file_exports_round_trip() {
        let adj = sample_adjustment();
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("salariapp_datos.csv");
        write_results_csv(&csv_path, &adj.records).unwrap();
        assert_eq!(read_results_csv(&csv_path).unwrap(), adj.records);

        let json_path = dir.path().join("salariapp_datos.json");
        write_results_json(&json_path, &adj).unwrap();
        let doc = read_results_json(&json_path).unwrap();
        assert_eq!(doc.tool, "salariapp");
        assert_eq!(doc.adjustment, adj);
    }
}
