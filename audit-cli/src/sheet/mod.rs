//! In-memory worksheet model and Excel I/O
//!
//! Tables are loaded whole with `calamine`, mutated in memory, and written
//! back with `rust_xlsxwriter`. Cell formatting does not survive the round
//! trip; values and sheet order do.

pub mod reader;
pub mod table;
pub mod value;
pub mod writer;

pub use reader::{load_first_sheet, load_workbook};
pub use table::{Table, column_letter, coordinate};
pub use value::CellValue;
pub use writer::write_workbook;
