//! Timestamped artifact files
//!
//! Every run leaves audit artifacts in the log directory: a meter-propagation
//! log workbook, a duplicates workbook (only when duplicates were found), and
//! matched/unmatched serial CSVs. Artifacts are written once and never
//! updated; a failed run leaves whatever was already written in place.

use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use std::path::{Path, PathBuf};

use crate::sheet::{CellValue, Table, write_workbook};

use super::carry_forward::AuditRecord;
use super::dedupe::DuplicateRecord;

/// File-name timestamp shared by all artifacts of one run.
pub fn timestamp_slug() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Write the carry-forward audit log: one row per propagated cell, columns
/// Timestamp / Cell / Value. Written every run, even when no cells changed.
pub fn write_meter_log(log_dir: &Path, slug: &str, records: &[AuditRecord]) -> Result<PathBuf> {
    let path = log_dir.join(format!("bw_start_meter_log_{}.xlsx", slug));

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(records.len() + 1);
    rows.push(vec![
        CellValue::from("Timestamp"),
        CellValue::from("Cell"),
        CellValue::from("Value"),
    ]);
    for record in records {
        rows.push(vec![
            CellValue::String(record.timestamp.clone()),
            CellValue::String(record.cell.clone()),
            record.value.clone(),
        ]);
    }

    write_workbook(&[Table::new("Sheet1", rows)], &path)?;
    Ok(path)
}

/// Write quarantined duplicates under the current table's original headers.
pub fn write_duplicates(
    log_dir: &Path,
    slug: &str,
    headers: &[String],
    duplicates: &[DuplicateRecord],
) -> Result<PathBuf> {
    let path = log_dir.join(format!("duplicates_{}.xlsx", slug));

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(duplicates.len() + 1);
    rows.push(headers.iter().map(|h| CellValue::from(h.as_str())).collect());
    for duplicate in duplicates {
        rows.push(duplicate.cells.clone());
    }

    write_workbook(&[Table::new("Sheet1", rows)], &path)?;
    Ok(path)
}

/// Write one single-column serial CSV, e.g. matched_serials_<ts>.csv with a
/// "Matched Serials" header.
pub fn write_serials_csv(
    log_dir: &Path,
    slug: &str,
    stem: &str,
    column: &str,
    serials: &[String],
) -> Result<PathBuf> {
    let path = log_dir.join(format!("{}_{}.csv", stem, slug));

    let mut wtr = Writer::from_path(&path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record([column])
        .context("Failed to write CSV header")?;
    for serial in serials {
        wtr.write_record([serial.as_str()])
            .with_context(|| format!("Failed to write serial: {}", serial))?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;

    Ok(path)
}
