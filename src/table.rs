/// Display table projection
///
/// Turns a grid into plain strings for the console and JSON export. The
/// timestamp column goes through the date normalizer; every other cell is
/// shown as its literal string form.
use crate::columns::{ColumnRole, find_column};
use crate::config::ColumnsConfig;
use crate::dates::DateNormalizer;
use crate::types::{Grid, cell_at};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DisplayTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Widest of the header and every row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).fold(self.headers.len(), usize::max)
    }
}

/// Project `grid` into display strings, one row per data row. Rows are
/// padded to the header width; cells past the header are kept.
pub fn render_table(grid: &Grid, columns: &ColumnsConfig, dates: &DateNormalizer) -> DisplayTable {
    let Some(header) = grid.header() else {
        return DisplayTable::default();
    };

    let timestamp_col = find_column(header, columns.pattern(ColumnRole::Timestamp));
    let headers: Vec<String> = header.iter().map(|h| h.display()).collect();

    let rows = grid
        .data_rows()
        .map(|row| {
            (0..headers.len().max(row.len()))
                .map(|col| {
                    let cell = cell_at(row, col);
                    if Some(col) == timestamp_col { dates.format_cell(cell) } else { cell.display() }
                })
                .collect()
        })
        .collect();

    DisplayTable { headers, rows }
}
