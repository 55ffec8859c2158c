//! Carry-forward of closing meter readings
//!
//! Copies the previous period's "End Meter" into the current period's
//! "B/W Start Meter", row by row. Propagation is by row POSITION: the two
//! files are assumed to list equipment in the same order. That assumption is
//! checked, not trusted silently - a row-count mismatch is reported to the
//! caller so it can be surfaced as a warning.

use chrono::Local;

use crate::error::AuditError;
use crate::sheet::{CellValue, Table, coordinate};

/// One mutated cell, recorded alongside the write. Append-only.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub timestamp: String,
    /// A1-style coordinate of the destination cell
    pub cell: String,
    /// The value written
    pub value: CellValue,
}

/// Outcome of a carry-forward pass.
#[derive(Debug)]
pub struct CarryForward {
    /// One record per propagated cell, in row order
    pub records: Vec<AuditRecord>,
    /// Data row counts of (previous, current) when they differ
    pub row_count_mismatch: Option<(usize, usize)>,
}

/// Copy the source column of `previous` into the destination column of
/// `current` for every data row of `current`, recording each write.
pub fn propagate_start_meters(
    previous: &Table,
    current: &mut Table,
    source_header: &str,
    dest_header: &str,
) -> Result<CarryForward, AuditError> {
    let end_col = previous.find_column(source_header)?;
    let dest_col = current.find_column(dest_header)?;

    let prev_rows = previous.last_row().saturating_sub(1);
    let curr_rows = current.last_row().saturating_sub(1);
    let row_count_mismatch = (prev_rows != curr_rows).then_some((prev_rows, curr_rows));

    let mut records = Vec::with_capacity(curr_rows);
    for row in 2..=current.last_row() {
        let value = previous.cell(row, end_col).clone();
        records.push(AuditRecord {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            cell: coordinate(row, dest_col),
            value: value.clone(),
        });
        current.set_cell(row, dest_col, value);
    }

    Ok(CarryForward {
        records,
        row_count_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn previous() -> Table {
        Table::from_headers(
            "Sheet1",
            &["Serial Number", "End Meter"],
            vec![
                vec![CellValue::from("A1"), CellValue::Int(100)],
                vec![CellValue::from("B2"), CellValue::Int(200)],
            ],
        )
    }

    fn current() -> Table {
        Table::from_headers(
            "DATA",
            &["Serial Number", "B/W Start Meter"],
            vec![
                vec![CellValue::from("A1 "), CellValue::Null],
                vec![CellValue::from("C3"), CellValue::Null],
            ],
        )
    }

    #[test]
    fn test_copies_by_row_position() {
        let prev = previous();
        let mut curr = current();
        let outcome =
            propagate_start_meters(&prev, &mut curr, "End Meter", "B/W Start Meter").unwrap();

        assert_eq!(curr.cell(2, 2), &CellValue::Int(100));
        assert_eq!(curr.cell(3, 2), &CellValue::Int(200));
        assert!(outcome.row_count_mismatch.is_none());
    }

    #[test]
    fn test_records_every_write_with_coordinates() {
        let prev = previous();
        let mut curr = current();
        let outcome =
            propagate_start_meters(&prev, &mut curr, "End Meter", "B/W Start Meter").unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].cell, "B2");
        assert_eq!(outcome.records[1].cell, "B3");
        assert_eq!(outcome.records[0].value, CellValue::Int(100));
    }

    #[test]
    fn test_row_count_mismatch_detected() {
        let prev = previous();
        let mut curr = current();
        curr.set_cell(4, 1, CellValue::from("D4"));
        let outcome =
            propagate_start_meters(&prev, &mut curr, "End Meter", "B/W Start Meter").unwrap();

        assert_eq!(outcome.row_count_mismatch, Some((2, 3)));
        // Current rows beyond the previous table get empty values
        assert!(curr.cell(4, 2).is_empty());
        assert_eq!(outcome.records.len(), 3);
    }

    #[test]
    fn test_missing_source_column_errors() {
        let prev = Table::from_headers("Sheet1", &["Serial Number"], vec![]);
        let mut curr = current();
        let err =
            propagate_start_meters(&prev, &mut curr, "End Meter", "B/W Start Meter").unwrap_err();
        assert!(err.to_string().contains("End Meter"));
    }
}
