//! Serial number canonicalization

use crate::sheet::CellValue;

/// Canonical matching key for a serial number cell: the cell's text with
/// every whitespace character removed, internal whitespace included. Empty
/// cells normalize to the empty string and are never eligible for matching.
pub fn serial_key(value: &CellValue) -> String {
    value.to_string().split_whitespace().collect()
}
