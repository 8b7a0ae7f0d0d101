//! Row filtering by an inclusive day range.
//!
//! The header row is always kept. A data row is kept when its timestamp,
//! once normalized, falls inside the closed interval
//! `[start 00:00:00.000, end 23:59:59.999]`. Rows without a usable
//! timestamp never match a bounded range.

use crate::dates::{DateNormalizer, NormalizedDate};
use crate::error::AppError;
use crate::types::{Cell, Grid, cell_at};
use crate::ui::Notice;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};

/// Optional calendar-day bounds; an absent side is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// First instant of the start day
    pub fn lower_bound(&self) -> Option<NaiveDateTime> {
        self.start.and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0))
    }

    /// Last millisecond of the end day
    pub fn upper_bound(&self) -> Option<NaiveDateTime> {
        self.end.and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let after_start = self.lower_bound().is_none_or(|lo| *ts >= lo);
        let before_end = self.upper_bound().is_none_or(|hi| *ts <= hi);
        after_start && before_end
    }
}

/// Which of the distinct filter results was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// No bounds given; the grid was copied unchanged
    Unfiltered,
    /// The input had no data rows to begin with
    HeaderOnly,
    /// Data existed but nothing fell inside the range
    NoMatches,
    Matched(usize),
}

impl FilterKind {
    pub fn notice(&self) -> Notice {
        match self {
            FilterKind::Unfiltered => Notice::info("No date filter applied. Showing all rows."),
            FilterKind::HeaderOnly => Notice::info("The spreadsheet has no data rows to filter."),
            FilterKind::NoMatches => Notice::info("No rows found for the selected dates."),
            FilterKind::Matched(n) => Notice::success(format!("Filter applied! Showing {} rows.", n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    pub grid: Grid,
    pub kind: FilterKind,
}

/// Filter `original` to the rows whose timestamp lies in `range`.
///
/// With both bounds absent this is an identity copy and the timestamp
/// column is not consulted. Otherwise an unresolved timestamp column is
/// an error; unusable timestamps only drop their row.
pub fn filter_rows(
    original: &Grid,
    range: &DateRange,
    timestamp_col: Option<usize>,
    timestamp_pattern: &str,
    dates: &DateNormalizer,
) -> Result<Filtered, AppError> {
    if range.is_unbounded() {
        return Ok(Filtered { grid: original.clone(), kind: FilterKind::Unfiltered });
    }

    let col = timestamp_col.ok_or_else(|| AppError::MissingColumns(vec![timestamp_pattern.to_string()]))?;

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(original.len());
    let mut sheet_rows: Vec<usize> = Vec::with_capacity(original.len());
    if let Some(header) = original.header() {
        rows.push(header.to_vec());
        sheet_rows.push(original.header_sheet_row());
    }

    for (sheet_row, row) in original.numbered_data_rows() {
        match dates.normalize(cell_at(row, col)) {
            NormalizedDate::Parsed(ts) => {
                if range.contains(&ts) {
                    rows.push(row.to_vec());
                    sheet_rows.push(sheet_row);
                }
            }
            NormalizedDate::Missing => {
                debug!("row {} has no timestamp; excluded from filter", sheet_row);
            }
            NormalizedDate::Unparseable(raw) => {
                warn!("Invalid date on row {}: {}. The row is ignored by the filter.", sheet_row, raw);
            }
        }
    }

    let grid = Grid::with_sheet_rows(rows, sheet_rows);
    let kind = if original.data_len() == 0 {
        FilterKind::HeaderOnly
    } else if grid.data_len() == 0 {
        FilterKind::NoMatches
    } else {
        FilterKind::Matched(grid.data_len())
    };

    debug!("filter kept {} of {} data rows", grid.data_len(), original.data_len());
    Ok(Filtered { grid, kind })
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;
