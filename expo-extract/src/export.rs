//! Writing harvested records as CSV or JSON.
//!
//! CSV rows are heterogeneous (successes and failures carry different
//! columns), so the header is the union of the columns present, in canonical
//! order, and cells a record lacks are left blank.

use crate::record::{ExhibitorRecord, ERROR_COLUMN, FIELD_COLUMNS};
use expo_common::{ExpoError, OutputFormat};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Header for `records`: every column any record carries, canonical order.
pub fn csv_header(records: &[ExhibitorRecord]) -> Vec<&'static str> {
    let any_success = records.iter().any(|r| !r.is_failed());
    let any_failure = records.iter().any(ExhibitorRecord::is_failed);

    let mut header = Vec::new();
    for column in FIELD_COLUMNS {
        if any_success || column == "url" {
            header.push(column);
        }
    }
    if any_failure {
        header.push(ERROR_COLUMN);
    }
    header
}

/// Render one record against `header`. Strings are written verbatim, lists
/// and objects as compact JSON, absent columns as empty cells.
fn csv_row(record: &ExhibitorRecord, header: &[&str]) -> Result<Vec<String>, ExportError> {
    let value = serde_json::to_value(record)?;
    Ok(header
        .iter()
        .map(|column| match value.get(*column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
        .collect())
}

pub fn write_csv<W: Write>(writer: W, records: &[ExhibitorRecord]) -> Result<(), ExportError> {
    let header = csv_header(records);
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&header)?;
    for record in records {
        out.write_record(csv_row(record, &header)?)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut writer: W, records: &[ExhibitorRecord]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Create `path` and write `records` in `format`.
pub fn write_records(
    path: &Path,
    format: OutputFormat,
    records: &[ExhibitorRecord],
) -> expo_common::Result<()> {
    let to_export_error = |e: ExportError| ExpoError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let file = File::create(path)
        .map_err(ExportError::from)
        .map_err(to_export_error)?;
    let writer = BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_csv(writer, records),
        OutputFormat::Json => write_json(writer, records),
    }
    .map_err(to_export_error)
}
