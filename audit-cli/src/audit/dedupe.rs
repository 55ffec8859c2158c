//! Duplicate quarantine
//!
//! Runs before any other mutation of the current table. Duplicate serials are
//! compared by their raw stored text, not by normalized key; matching later
//! uses normalized keys. The distinction is deliberate and preserved.

use std::collections::HashSet;

use crate::error::AuditError;
use crate::sheet::{CellValue, Table};

/// Full snapshot of a quarantined row.
#[derive(Debug, Clone)]
pub struct DuplicateRecord {
    /// 1-based worksheet row the duplicate was found on
    pub row: usize,
    /// Every cell of the row, in column order, as it was before blanking
    pub cells: Vec<CellValue>,
}

/// Scan the table top to bottom for repeated raw serial values. The first
/// occurrence of a value keeps its serial; every later occurrence has its
/// full row snapshotted and its serial cell blanked in place. The rest of the
/// row is left untouched, so later steps see the row as serial-less rather
/// than deleted.
pub fn quarantine_duplicates(
    table: &mut Table,
    serial_header: &str,
) -> Result<Vec<DuplicateRecord>, AuditError> {
    let serial_col = table.find_column(serial_header)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = Vec::new();

    for row in 2..=table.last_row() {
        let raw = table.cell(row, serial_col).raw_text();
        if seen.insert(raw) {
            continue;
        }
        duplicates.push(DuplicateRecord {
            row,
            cells: table.row_snapshot(row),
        });
        table.set_cell(row, serial_col, CellValue::Null);
    }

    Ok(duplicates)
}
