/// Core data structures for spreadsheet rows
///
/// This module defines the grid model shared by the row filter, the table
/// renderer and the report layout engine. Row 0 of a grid is always the
/// header; every other row is addressed with the header's column indices.
use serde::Serialize;
use std::fmt;

/// A single spreadsheet cell after decoding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Build a text cell
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// True for cells the form export treats as "no value": empty cells,
    /// empty strings and a numeric zero
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(n) => *n == 0.0,
        }
    }

    /// Literal display form, empty cells become an empty string
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// Display form, or `placeholder` when the cell is blank
    pub fn text_or(&self, placeholder: &str) -> String {
        if self.is_blank() { placeholder.to_string() } else { self.display() }
    }

    /// Header matching only considers string cells
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Cell at `col`, treating short rows as padded with empty cells
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY_CELL)
}

/// Row-major grid of cells; row 0 is the header
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    /// 1-based worksheet line of each row
    #[serde(skip)]
    sheet_rows: Vec<usize>,
}

impl Grid {
    /// Grid whose rows sit on consecutive worksheet lines starting at 1
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        let sheet_rows = (1..=rows.len()).collect();
        Self { rows, sheet_rows }
    }

    /// Grid that remembers where each row came from in the worksheet.
    /// Missing line numbers continue on from the last known one.
    pub fn with_sheet_rows(rows: Vec<Vec<Cell>>, mut sheet_rows: Vec<usize>) -> Self {
        sheet_rows.truncate(rows.len());
        while sheet_rows.len() < rows.len() {
            let next = sheet_rows.last().map_or(1, |n| n + 1);
            sheet_rows.push(next);
        }
        Self { rows, sheet_rows }
    }

    /// Header row, if the grid has any rows at all
    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// All rows after the header, in sheet order
    pub fn data_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().skip(1).map(|r| r.as_slice())
    }

    /// Worksheet line of the header row
    pub fn header_sheet_row(&self) -> usize {
        self.sheet_rows.first().copied().unwrap_or(1)
    }

    /// Data rows paired with their 1-based worksheet line
    pub fn numbered_data_rows(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.sheet_rows.iter().copied().zip(self.rows.iter().map(|r| r.as_slice())).skip(1)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Total row count including the header
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows after the header
    pub fn data_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}
