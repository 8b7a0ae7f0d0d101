/// Spreadsheet decoding
///
/// This module handles:
/// - Opening any workbook format calamine understands
/// - Reading only the first worksheet
/// - Converting calamine cells into the grid model
use crate::error::AppError;
use crate::types::{Cell, Grid};
use calamine::{Data, Reader, open_workbook_auto};
use log::debug;
use std::path::Path;

/// Convert one calamine cell. Dates keep their serial so the date
/// normalizer sees the same encoding as any other numeric timestamp.
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        other => Cell::Text(other.to_string()),
    }
}

/// Drop trailing empty cells so short rows stay short
fn trim_trailing_empty(mut row: Vec<Cell>) -> Vec<Cell> {
    while matches!(row.last(), Some(Cell::Empty)) {
        row.pop();
    }
    row
}

/// Load the first worksheet of `path` as a grid.
///
/// Columns keep their sheet positions even when the used range does not
/// start at column A. Fully empty rows are skipped, but every kept row
/// remembers its worksheet line for diagnostics.
pub fn load_first_sheet(path: &Path) -> Result<Grid, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| AppError::Decode(e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| AppError::Decode(e.to_string()))?,
        None => return Err(AppError::Decode(format!("{} has no worksheets", path.display()))),
    };

    let (row_offset, col_offset) = range.start().map(|(row, col)| (row as usize, col as usize)).unwrap_or((0, 0));
    debug!("first sheet of {:?}: {:?} cells, column offset {}", path, range.get_size(), col_offset);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut sheet_rows: Vec<usize> = Vec::new();
    for (index, row) in range.rows().enumerate() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(convert_cell));
        let cells = trim_trailing_empty(cells);
        if cells.is_empty() {
            continue;
        }
        rows.push(cells);
        sheet_rows.push(row_offset + index + 1);
    }

    debug!("decoded {} rows", rows.len());
    Ok(Grid::with_sheet_rows(rows, sheet_rows))
}
