// ============================================================
// WORKBOOK READER
// ============================================================
// Parse spreadsheet bytes (xlsx, xls, xlsb, ods) into a Table

use crate::domain::error::{AppError, Result};
use crate::domain::table::{CellValue, Table};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::Cursor;
use tracing::{debug, warn};

/// Reads the first worksheet of a workbook. The first row of the used
/// range is the header.
#[derive(Debug, Default, Clone)]
pub struct WorkbookReader;

impl WorkbookReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse workbook bytes into a normalized table.
    pub fn load(&self, bytes: &[u8]) -> Result<Table> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
            warn!(error = %e, size = bytes.len(), "failed to open workbook");
            AppError::LoadError(e.to_string())
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::LoadError("No worksheet found".to_string()))?
            .map_err(|e| {
                warn!(error = %e, "failed to read worksheet range");
                AppError::LoadError(e.to_string())
            })?;

        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
        let table = build_table(rows);

        debug!(
            rows = table.row_count(),
            columns = table.column_count(),
            "workbook loaded"
        );

        Ok(table)
    }
}

/// Turns raw worksheet rows into a table.
pub(crate) fn build_table(rows: Vec<Vec<Data>>) -> Table {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Table::empty();
    };

    let names = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(idx, cell))
        .collect();

    let body = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Table::new(names, body)
}

fn header_name(idx: usize, cell: &Data) -> String {
    let name = match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        _ => convert_cell(cell).to_string(),
    };

    if name.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        name
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .or_else(|| cell.as_f64().map(CellValue::Number))
            .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
    .normalized()
}
