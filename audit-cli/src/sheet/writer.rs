//! Write [`Table`]s back out as Excel workbooks

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use super::table::Table;
use super::value::CellValue;

fn write_value(ws: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Null => { /* Leave cell empty */ }
        CellValue::String(s) => {
            ws.write_string(row, col, s)?;
        }
        CellValue::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        CellValue::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    worksheet.set_name(&table.sheet_name)?;
    for row in 1..=table.last_row() {
        for col in 1..=table.last_column() {
            let value = table.cell(row, col);
            if !matches!(value, CellValue::Null) {
                write_value(worksheet, (row - 1) as u32, (col - 1) as u16, value)?;
            }
        }
    }
    Ok(())
}

/// Write a set of tables as one workbook, one worksheet per table, in order.
pub fn write_workbook(tables: &[Table], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    for table in tables {
        let worksheet = workbook.add_worksheet();
        write_table(worksheet, table)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;
    Ok(())
}
