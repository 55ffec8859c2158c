//! Serial number matching against the previous period
//!
//! Builds a set of normalized keys from the previous table and partitions the
//! current table's serial rows into matched and unmatched. Matched rows get
//! the normalized key written into a helper column inserted next to the
//! serial column; unmatched rows have their serial blanked. The helper column
//! is transient scaffolding - a later cleanup step removes it before save.

use std::collections::HashSet;

use crate::error::AuditError;
use crate::sheet::{CellValue, Table};

use super::normalize::serial_key;

/// Partition of the current table's non-empty serial rows, both sides in
/// row-encounter order. Mutually exclusive and jointly complete.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Collect the normalized key set from a table's serial column, dropping
/// empty values.
pub fn previous_key_set(table: &Table, serial_header: &str) -> Result<HashSet<String>, AuditError> {
    let serial_col = table.find_column(serial_header)?;
    let mut keys = HashSet::new();
    for row in 2..=table.last_row() {
        let key = serial_key(table.cell(row, serial_col));
        if !key.is_empty() {
            keys.insert(key);
        }
    }
    Ok(keys)
}

/// Match the current table's serials against `previous_keys`.
///
/// Inserts the helper column immediately to the right of the serial column,
/// which shifts every later column one place rightward. Column positions are
/// re-resolved by name after the insertion; no position located before a
/// structural mutation is reused across it.
pub fn match_serials(
    current: &mut Table,
    previous_keys: &HashSet<String>,
    serial_header: &str,
    helper_header: &str,
) -> Result<MatchOutcome, AuditError> {
    let serial_col = current.find_column(serial_header)?;
    current.insert_column(serial_col + 1, helper_header);

    // Positions are stale after the insert; locate both again.
    let serial_col = current.find_column(serial_header)?;
    let helper_col = current.find_column(helper_header)?;

    let mut outcome = MatchOutcome::default();
    for row in 2..=current.last_row() {
        let raw = current.cell(row, serial_col);
        if raw.is_empty() {
            continue;
        }
        let key = serial_key(raw);
        if previous_keys.contains(&key) {
            current.set_cell(row, helper_col, CellValue::String(key.clone()));
            outcome.matched.push(key);
        } else {
            current.set_cell(row, serial_col, CellValue::Null);
            outcome.unmatched.push(key);
        }
    }

    Ok(outcome)
}
