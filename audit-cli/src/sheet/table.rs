//! In-memory worksheet with 1-based cell addressing
//!
//! Row 1 is the header row; data rows start at row 2, mirroring how the
//! workbooks are laid out on disk. Columns are located by header name and
//! addressed by 1-based position once found.

use crate::error::AuditError;

use super::value::CellValue;

/// An ordered grid of cells with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    /// Worksheet name this table was loaded from (or will be written to)
    pub sheet_name: String,
    /// All rows including the header; rows may be ragged
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(sheet_name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            rows,
        }
    }

    /// Build a table from a header row and data rows (test convenience).
    #[cfg(test)]
    pub fn from_headers(sheet_name: &str, headers: &[&str], data: Vec<Vec<CellValue>>) -> Self {
        let mut rows = vec![headers.iter().map(|h| CellValue::from(*h)).collect()];
        rows.extend(data);
        Self::new(sheet_name, rows)
    }

    /// Last populated row, 1-based. A table with only a header row reports 1;
    /// an entirely empty table reports 0.
    pub fn last_row(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the table, 1-based column count.
    pub fn last_column(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Read a cell at 1-based (row, col). Cells outside any stored row are
    /// empty, as in a real worksheet.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Null;
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY)
    }

    /// Write a cell at 1-based (row, col), growing the grid as needed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let r = &mut self.rows[row - 1];
        if r.len() < col {
            r.resize(col, CellValue::Null);
        }
        r[col - 1] = value;
    }

    /// Header titles in column order, rendered as text.
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default()
    }

    /// Locate a column by header name, scanning header cells left to right.
    /// Comparison trims surrounding whitespace and ignores case; the first
    /// matching cell wins. Returns the 1-based column position.
    pub fn find_column(&self, header: &str) -> Result<usize, AuditError> {
        let wanted = header.trim().to_lowercase();
        let header_row = self.rows.first().map(|r| r.as_slice()).unwrap_or(&[]);
        for (idx, cell) in header_row.iter().enumerate() {
            if !cell.is_empty() && cell.to_string().trim().to_lowercase() == wanted {
                return Ok(idx + 1);
            }
        }
        Err(AuditError::ColumnNotFound {
            header: header.to_string(),
            sheet: self.sheet_name.clone(),
        })
    }

    /// Check for a header cell whose trimmed text equals `header` exactly
    /// (case-sensitive). Used by validation, which is stricter than lookup.
    pub fn has_header_exact(&self, header: &str) -> bool {
        let header_row = self.rows.first().map(|r| r.as_slice()).unwrap_or(&[]);
        header_row
            .iter()
            .any(|cell| cell.to_string().trim() == header)
    }

    /// Insert a new empty column at 1-based position `col`, shifting that
    /// column and everything to its right one place rightward, then set the
    /// header cell.
    pub fn insert_column(&mut self, col: usize, header: &str) {
        for row in &mut self.rows {
            if row.len() >= col {
                row.insert(col - 1, CellValue::Null);
            }
        }
        self.set_cell(1, col, CellValue::from(header));
    }

    /// Remove the first column whose header cell equals `name` exactly (no
    /// trimming, no case folding). Returns whether a column was removed.
    pub fn remove_column(&mut self, name: &str) -> bool {
        let header_row = self.rows.first().map(|r| r.as_slice()).unwrap_or(&[]);
        let found = header_row
            .iter()
            .position(|cell| matches!(cell, CellValue::String(s) if s == name));
        let Some(idx) = found else {
            return false;
        };
        for row in &mut self.rows {
            if row.len() > idx {
                row.remove(idx);
            }
        }
        true
    }

    /// Snapshot an entire row (all columns up to the table's widest row),
    /// padding short rows with empty cells.
    pub fn row_snapshot(&self, row: usize) -> Vec<CellValue> {
        let width = self.last_column();
        (1..=width).map(|col| self.cell(row, col).clone()).collect()
    }
}

/// A1-style coordinate for a 1-based (row, col) pair, e.g. (5, 4) -> "D5".
pub fn coordinate(row: usize, col: usize) -> String {
    format!("{}{}", column_letter(col), row)
}

/// Spreadsheet column letters for a 1-based position: 1 -> "A", 26 -> "Z",
/// 27 -> "AA".
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
