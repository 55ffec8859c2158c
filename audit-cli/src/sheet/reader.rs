//! Read worksheets from Excel files into [`Table`]s

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx, open_workbook};
use std::path::Path;

use super::table::Table;
use super::value::CellValue;

/// Convert an Excel cell to a [`CellValue`]. Dates and durations arrive as
/// text; error cells read as empty.
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::String(format!("{}", dt)),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

fn range_to_table(sheet_name: &str, range: &calamine::Range<Data>) -> Table {
    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|r| r.iter().map(cell_to_value).collect())
        .collect();
    Table::new(sheet_name, rows)
}

/// Load the first worksheet of a workbook.
pub fn load_first_sheet(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .with_context(|| format!("Excel file has no sheets: {}", path.display()))?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    Ok(range_to_table(&sheet_name, &range))
}

/// Load every worksheet of a workbook, in workbook order. Sheet order and
/// names are preserved so the workbook can be written back whole.
pub fn load_workbook(path: &Path) -> Result<Vec<Table>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        bail!("Excel file has no sheets: {}", path.display());
    }

    let mut tables = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;
        tables.push(range_to_table(&sheet_name, &range));
    }

    Ok(tables)
}
