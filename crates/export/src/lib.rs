//! Workbook export — serializes an already-computed report into a
//! multi-sheet structure for spreadsheet download. No new derivation
//! happens here.

pub mod workbook;

pub use workbook::{build_workbook, ReportWorkbook, Sheet};
