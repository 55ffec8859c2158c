//! Cell value representation for in-memory worksheets

/// A single worksheet cell, reduced to the shapes the audit cares about.
///
/// Dates and formula results arrive from the reader already rendered as text,
/// so there is no dedicated datetime variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Null,
    /// Text value
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl CellValue {
    /// Check if this cell holds nothing usable: empty, or text that is empty
    /// once trimmed.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual form of the cell as stored, used for raw (non-normalized)
    /// comparisons. Whole floats render without a fractional part so `100`
    /// and `100.0` compare equal, matching how the values round-trip through
    /// a workbook.
    pub fn raw_text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(fl) => {
                if fl.fract() == 0.0 && fl.abs() < i64::MAX as f64 {
                    write!(f, "{}", *fl as i64)
                } else {
                    write!(f, "{}", fl)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}
